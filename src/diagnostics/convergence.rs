//! Rank-normalized split R-hat and effective sample size (Vehtari et al.
//! 2021)
//!
//! Every function takes the draws of one scalar quantity as one slice per
//! chain. Chains shorter than four draws, or quantities that never change,
//! give `NaN`.
use crate::misc::{mean, normal_quantile, quantile, ranks, variance};

/// Split every chain into its first and second half, dropping the middle
/// draw of odd-length chains
pub fn split_chains(chains: &[Vec<f64>]) -> Vec<Vec<f64>> {
    chains
        .iter()
        .flat_map(|chain| {
            let half = chain.len() / 2;
            let offset = chain.len() - half;
            [chain[..half].to_vec(), chain[offset..].to_vec()]
        })
        .collect()
}

fn usable(chains: &[Vec<f64>]) -> bool {
    let n = chains.first().map_or(0, Vec::len);
    n >= 4 && chains.iter().all(|c| c.len() == n && c.iter().all(|x| x.is_finite()))
}

fn is_constant(chains: &[Vec<f64>]) -> bool {
    let mut all = chains.iter().flatten();
    match all.next() {
        Some(first) => all.all(|x| x == first),
        None => true,
    }
}

/// Replace draws by the normal scores of their pooled ranks
pub fn rank_normalize(chains: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let pooled: Vec<f64> = chains.iter().flatten().copied().collect();
    let s = pooled.len() as f64;
    let mut z = ranks(&pooled)
        .into_iter()
        .map(|r| normal_quantile((r - 0.375) / (s + 0.25)));
    chains
        .iter()
        .map(|chain| z.by_ref().take(chain.len()).collect())
        .collect()
}

fn rhat_basic(chains: &[Vec<f64>]) -> f64 {
    let n = chains[0].len() as f64;
    let chain_means: Vec<f64> = chains.iter().map(|c| mean(c)).collect();
    let within = mean(&chains.iter().map(|c| variance(c, 1)).collect::<Vec<_>>());
    let between = if chains.len() > 1 {
        n * variance(&chain_means, 1)
    } else {
        0.0
    };
    let var_plus = (n - 1.0) / n * within + between / n;
    (var_plus / within).sqrt()
}

/// Rank-normalized split R-hat, the larger of the bulk and folded-tail
/// versions. Values above 1.01 suggest the chains disagree.
///
/// # Example
///
/// ```
/// use genmodel::diagnostics::rhat;
///
/// let a: Vec<f64> = (0..100).map(|i| f64::from(i % 10)).collect();
/// let b: Vec<f64> = (0..100).map(|i| f64::from((i + 5) % 10)).collect();
/// assert!(rhat(&[a.clone(), b]) < 1.05);
///
/// let far: Vec<f64> = a.iter().map(|x| x + 50.0).collect();
/// assert!(rhat(&[a, far]) > 1.5);
/// ```
pub fn rhat(chains: &[Vec<f64>]) -> f64 {
    if !usable(chains) || is_constant(chains) {
        return f64::NAN;
    }
    let split = split_chains(chains);
    let bulk = rhat_basic(&rank_normalize(&split));

    let pooled: Vec<f64> = chains.iter().flatten().copied().collect();
    let median = quantile(&pooled, 0.5);
    let folded: Vec<Vec<f64>> = split
        .iter()
        .map(|c| c.iter().map(|x| (x - median).abs()).collect())
        .collect();
    let tail = rhat_basic(&rank_normalize(&folded));
    bulk.max(tail)
}

/// Biased autocovariance of `xs` at `lag`
fn autocov(xs: &[f64], m: f64, lag: usize) -> f64 {
    let n = xs.len();
    if lag >= n {
        return 0.0;
    }
    xs[..n - lag]
        .iter()
        .zip(&xs[lag..])
        .map(|(a, b)| (a - m) * (b - m))
        .sum::<f64>()
        / n as f64
}

/// Effective sample size from Geyer's initial monotone sequence estimator
/// of the autocorrelation sum, combining chains as in Stan
fn ess_basic(chains: &[Vec<f64>]) -> f64 {
    let n_chains = chains.len();
    let n = chains[0].len();
    if n < 4 {
        return f64::NAN;
    }
    let chain_means: Vec<f64> = chains.iter().map(|c| mean(c)).collect();
    // mean over chains of the autocovariance at `lag`
    let acov = |lag: usize| -> f64 {
        chains
            .iter()
            .zip(&chain_means)
            .map(|(c, &m)| autocov(c, m, lag))
            .sum::<f64>()
            / n_chains as f64
    };

    let nf = n as f64;
    let mean_var = acov(0) * nf / (nf - 1.0);
    let mut var_plus = mean_var * (nf - 1.0) / nf;
    if n_chains > 1 {
        var_plus += variance(&chain_means, 1);
    }
    let rho = |lag: usize| 1.0 - (mean_var - acov(lag)) / var_plus;

    let mut rho_hat = vec![0.0; n];
    rho_hat[0] = 1.0;
    let mut rho_even = 1.0;
    let mut rho_odd = rho(1);
    rho_hat[1] = rho_odd;

    let mut t = 1;
    while t < n - 3 && rho_even + rho_odd > 0.0 {
        rho_even = rho(t + 1);
        rho_odd = rho(t + 2);
        if rho_even + rho_odd >= 0.0 {
            rho_hat[t + 1] = rho_even;
            rho_hat[t + 2] = rho_odd;
        }
        t += 2;
    }
    let max_t = t.saturating_sub(2);
    if rho_even > 0.0 {
        rho_hat[max_t + 1] = rho_even;
    }

    // enforce a monotone sequence of paired sums
    let mut t = 1;
    while t + 2 <= max_t {
        let prev = rho_hat[t - 1] + rho_hat[t];
        if rho_hat[t + 1] + rho_hat[t + 2] > prev {
            rho_hat[t + 1] = prev / 2.0;
            rho_hat[t + 2] = rho_hat[t + 1];
        }
        t += 2;
    }

    let total = (n_chains * n) as f64;
    let tau = -1.0 + 2.0 * rho_hat[..=max_t].iter().sum::<f64>() + rho_hat[max_t + 1];
    let tau = tau.max(1.0 / total.log10());
    total / tau
}

/// Bulk effective sample size: the ESS of the rank-normalized split chains
pub fn ess_bulk(chains: &[Vec<f64>]) -> f64 {
    if !usable(chains) || is_constant(chains) {
        return f64::NAN;
    }
    ess_basic(&rank_normalize(&split_chains(chains)))
}

/// Tail effective sample size: the smaller ESS of the indicators of being
/// below the 5% and above the 95% quantile
pub fn ess_tail(chains: &[Vec<f64>]) -> f64 {
    if !usable(chains) || is_constant(chains) {
        return f64::NAN;
    }
    let pooled: Vec<f64> = chains.iter().flatten().copied().collect();
    let split = split_chains(chains);
    let ess = [quantile(&pooled, 0.05), quantile(&pooled, 0.95)]
        .iter()
        .map(|&q| {
            let indicator: Vec<Vec<f64>> = split
                .iter()
                .map(|c| c.iter().map(|&x| f64::from(u8::from(x <= q))).collect())
                .collect();
            if is_constant(&indicator) {
                f64::NAN
            } else {
                ess_basic(&indicator)
            }
        })
        .fold(f64::INFINITY, f64::min);
    if ess.is_finite() {
        ess
    } else {
        f64::NAN
    }
}

/// Effective sample size for the mean, on the raw split chains
pub fn ess_mean(chains: &[Vec<f64>]) -> f64 {
    if !usable(chains) || is_constant(chains) {
        return f64::NAN;
    }
    ess_basic(&split_chains(chains))
}

/// Monte Carlo standard error of the posterior mean
pub fn mcse_mean(chains: &[Vec<f64>]) -> f64 {
    let pooled: Vec<f64> = chains.iter().flatten().copied().collect();
    (variance(&pooled, 1) / ess_mean(chains)).sqrt()
}
