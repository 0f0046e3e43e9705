//! Warm-up adaptation of the step size and the diagonal mass matrix
use crate::model::LogDensity;

/// Nesterov dual averaging of the log step size (Hoffman & Gelman 2014)
#[derive(Clone, Debug)]
pub(crate) struct DualAveraging {
    target: f64,
    mu: f64,
    log_step: f64,
    log_step_bar: f64,
    h_bar: f64,
    count: f64,
}

impl DualAveraging {
    const GAMMA: f64 = 0.05;
    const T0: f64 = 10.0;
    const KAPPA: f64 = 0.75;

    pub(crate) fn new(step_size: f64, target: f64) -> Self {
        DualAveraging {
            target,
            mu: (10.0 * step_size).ln(),
            log_step: step_size.ln(),
            log_step_bar: 0.0,
            h_bar: 0.0,
            count: 0.0,
        }
    }

    /// Restart around a new step size, e.g. after the mass matrix changed
    pub(crate) fn restart(&mut self, step_size: f64) {
        *self = DualAveraging::new(step_size, self.target);
    }

    pub(crate) fn update(&mut self, accept: f64) {
        let accept = if accept.is_finite() { accept.min(1.0) } else { 0.0 };
        self.count += 1.0;
        let t = self.count;
        let w = 1.0 / (t + Self::T0);
        self.h_bar = (1.0 - w).mul_add(self.h_bar, w * (self.target - accept));
        self.log_step = self.mu - t.sqrt() / Self::GAMMA * self.h_bar;
        let eta = t.powf(-Self::KAPPA);
        self.log_step_bar = eta.mul_add(self.log_step, (1.0 - eta) * self.log_step_bar);
    }

    /// Step size to use for the next warm-up iteration
    pub(crate) fn current(&self) -> f64 {
        self.log_step.exp()
    }

    /// Step size to use once warm-up is over
    pub(crate) fn final_step(&self) -> f64 {
        self.log_step_bar.exp()
    }
}

/// Running mean and variance (Welford)
#[derive(Clone, Debug)]
pub(crate) struct RunningVariance {
    n: f64,
    mean: Vec<f64>,
    m2: Vec<f64>,
}

impl RunningVariance {
    pub(crate) fn new(dim: usize) -> Self {
        RunningVariance {
            n: 0.0,
            mean: vec![0.0; dim],
            m2: vec![0.0; dim],
        }
    }

    pub(crate) fn add(&mut self, x: &[f64]) {
        self.n += 1.0;
        for ((m, s), &xi) in self.mean.iter_mut().zip(self.m2.iter_mut()).zip(x) {
            let delta = xi - *m;
            *m += delta / self.n;
            *s += delta * (xi - *m);
        }
    }

    pub(crate) fn count(&self) -> usize {
        self.n as usize
    }

    /// Variance shrunk towards 1e-3 as in Stan's regularized estimator
    pub(crate) fn regularized(&self) -> Vec<f64> {
        let n = self.n;
        self.m2
            .iter()
            .map(|&s| {
                let var = if n > 1.0 { s / (n - 1.0) } else { 1.0 };
                (n / (n + 5.0)) * var + 1E-3 * (5.0 / (n + 5.0))
            })
            .collect()
    }
}

/// Stan style warm-up schedule: a fast initial buffer for the step size,
/// doubling slow windows that estimate the mass matrix, and a fast
/// terminal buffer.
#[derive(Clone, Debug)]
pub(crate) struct WindowedAdaptation {
    dual: DualAveraging,
    variance: RunningVariance,
    inv_mass: Vec<f64>,
    tune: usize,
    init_buffer: usize,
    term_buffer: usize,
    window_end: usize,
    window_size: usize,
}

impl WindowedAdaptation {
    const INIT_BUFFER: usize = 75;
    const TERM_BUFFER: usize = 50;
    const BASE_WINDOW: usize = 25;

    pub(crate) fn new(dim: usize, tune: usize, target: f64, step_size: f64) -> Self {
        let (init_buffer, term_buffer, window_size) =
            if tune < Self::INIT_BUFFER + Self::TERM_BUFFER + Self::BASE_WINDOW {
                // too short for the full schedule
                let init = tune * 15 / 100;
                let term = tune / 10;
                (init, term, tune.saturating_sub(init + term))
            } else {
                (Self::INIT_BUFFER, Self::TERM_BUFFER, Self::BASE_WINDOW)
            };
        WindowedAdaptation {
            dual: DualAveraging::new(step_size, target),
            variance: RunningVariance::new(dim),
            inv_mass: vec![1.0; dim],
            tune,
            init_buffer,
            term_buffer,
            window_end: init_buffer + window_size,
            window_size,
        }
    }

    pub(crate) fn step_size(&self) -> f64 {
        self.dual.current()
    }

    pub(crate) fn final_step_size(&self) -> f64 {
        self.dual.final_step()
    }

    pub(crate) fn inv_mass(&self) -> &[f64] {
        &self.inv_mass
    }

    /// Record warm-up iteration `i`. Returns `true` if the mass matrix
    /// changed, in which case the caller should look for a new step size
    /// and call [`WindowedAdaptation::restart_step`].
    pub(crate) fn update(&mut self, i: usize, q: &[f64], accept: f64) -> bool {
        self.dual.update(accept);
        if self.window_size == 0 {
            return false;
        }
        let slow_end = self.tune.saturating_sub(self.term_buffer);
        if i < self.init_buffer || i >= slow_end {
            return false;
        }
        self.variance.add(q);
        if i + 1 < self.window_end {
            return false;
        }

        self.inv_mass = self.variance.regularized();
        log::debug!(
            "mass matrix window ending at {} ({} draws)",
            i + 1,
            self.variance.count()
        );
        self.variance = RunningVariance::new(self.inv_mass.len());

        self.window_size *= 2;
        let next_end = self.window_end + self.window_size;
        // stretch the last window up to the terminal buffer
        self.window_end = if next_end + 2 * self.window_size > slow_end {
            slow_end
        } else {
            next_end
        };
        true
    }

    pub(crate) fn restart_step(&mut self, step_size: f64) {
        self.dual.restart(step_size);
    }
}

/// Double or halve a step size from `initial` until a single leapfrog step
/// crosses an acceptance probability of 1/2
pub(crate) fn find_reasonable_step_size(
    density: &LogDensity<'_>,
    q: &[f64],
    inv_mass: &[f64],
    initial: f64,
) -> f64 {
    let (lp0, grad0) = density.logp_and_grad(q);
    if !lp0.is_finite() {
        return initial;
    }
    // unit momentum in every direction keeps this deterministic
    let p0: Vec<f64> = inv_mass.iter().map(|m| 1.0 / m.sqrt()).collect();
    let kinetic = |p: &[f64]| -> f64 {
        0.5 * p.iter().zip(inv_mass).map(|(pi, m)| pi * pi * m).sum::<f64>()
    };
    let h0 = kinetic(&p0) - lp0;

    let log_accept = |eps: f64| -> f64 {
        let mut p: Vec<f64> = p0
            .iter()
            .zip(&grad0)
            .map(|(p, g)| (0.5 * eps).mul_add(*g, *p))
            .collect();
        let q1: Vec<f64> = q
            .iter()
            .zip(&p)
            .zip(inv_mass)
            .map(|((qi, pi), m)| (eps * m).mul_add(*pi, *qi))
            .collect();
        let (lp1, grad1) = density.logp_and_grad(&q1);
        for (pi, g) in p.iter_mut().zip(&grad1) {
            *pi += 0.5 * eps * g;
        }
        let h1 = kinetic(&p) - lp1;
        let log_a = h0 - h1;
        if log_a.is_nan() {
            f64::NEG_INFINITY
        } else {
            log_a
        }
    };

    let mut eps = initial;
    let direction = if log_accept(eps) > 0.5_f64.ln() { 1.0 } else { -1.0 };
    for _ in 0..100 {
        let next = eps * 2.0_f64.powf(direction);
        let crossed = if direction > 0.0 {
            log_accept(next) < 0.5_f64.ln()
        } else {
            log_accept(next) > 0.5_f64.ln()
        };
        if crossed || !next.is_normal() {
            return if direction > 0.0 { eps } else { next };
        }
        eps = next;
    }
    eps
}
