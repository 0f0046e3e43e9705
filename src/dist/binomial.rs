//! Binomial distribution over k in {0, ..., n}
use rand::Rng;
use rand_distr::Binomial as RBinomial;

use super::{count, is_count, probability, xlny, ParamError};
use crate::misc::ln_binom;
use crate::traits::{HasDensity, Mean, Moment, Sampleable, Support, Variance};

/// [Binomial distribution](https://en.wikipedia.org/wiki/Binomial_distribution):
/// the number of successes in `n` trials with success probability `p`.
#[derive(Debug, Clone, PartialEq)]
pub struct Binomial {
    n: f64,
    p: f64,
}

impl Binomial {
    pub fn new(n: f64, p: f64) -> Result<Self, ParamError> {
        count("n", n)?;
        probability("p", p)?;
        Ok(Binomial { n, p })
    }

    #[inline]
    #[must_use]
    pub fn new_unchecked(n: f64, p: f64) -> Self {
        Binomial { n, p }
    }

    #[inline]
    pub fn n(&self) -> f64 {
        self.n
    }

    #[inline]
    pub fn p(&self) -> f64 {
        self.p
    }
}

impl From<&Binomial> for String {
    fn from(b: &Binomial) -> String {
        format!("Binomial(n: {}, p: {})", b.n, b.p)
    }
}

impl_display!(Binomial);

impl HasDensity for Binomial {
    fn ln_f(&self, k: f64) -> f64 {
        if !is_count(k) || k > self.n {
            return f64::NEG_INFINITY;
        }
        ln_binom(self.n, k) + xlny(k, self.p) + xlny(self.n - k, 1.0 - self.p)
    }
}

impl Sampleable for Binomial {
    fn draw<R: Rng>(&self, rng: &mut R) -> f64 {
        match RBinomial::new(self.n as u64, self.p) {
            Ok(b) => rng.sample(b) as f64,
            Err(_) => f64::NAN,
        }
    }
}

impl Support for Binomial {
    fn supports(&self, k: f64) -> bool {
        is_count(k) && k <= self.n
    }
}

impl Mean for Binomial {
    fn mean(&self) -> Option<f64> {
        Some(self.n * self.p)
    }
}

impl Variance for Binomial {
    fn variance(&self) -> Option<f64> {
        Some(self.n * self.p * (1.0 - self.p))
    }
}

impl Moment for Binomial {
    fn moment(&self) -> f64 {
        (self.n * self.p).round()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::misc::mean;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    #[test]
    fn ln_f_known_value() {
        let b = Binomial::new(10.0, 0.3).unwrap();
        assert::close(b.ln_f(4.0), -1.608_833_350_218_670_7, 1E-10);
    }

    #[test]
    fn outside_support() {
        let b = Binomial::new(5.0, 0.5).unwrap();
        assert_eq!(b.ln_f(6.0), f64::NEG_INFINITY);
        assert_eq!(b.ln_f(2.5), f64::NEG_INFINITY);
        assert_eq!(b.ln_f(-1.0), f64::NEG_INFINITY);
    }

    #[test]
    fn pmf_sums_to_one() {
        let b = Binomial::new(12.0, 0.35).unwrap();
        let total: f64 = (0..=12).map(|k| b.f(f64::from(k))).sum();
        assert::close(total, 1.0, 1E-10);
    }

    #[test]
    fn sample_mean() {
        let mut rng = Xoshiro256Plus::seed_from_u64(14);
        let b = Binomial::new(20.0, 0.25).unwrap();
        let xs = b.sample(10_000, &mut rng);
        assert!(xs.iter().all(|&k| b.supports(k)));
        assert::close(mean(&xs), 5.0, 0.1);
    }
}
