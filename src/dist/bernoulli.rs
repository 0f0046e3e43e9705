//! Bernoulli distribution over {0, 1}
use rand::Rng;

use super::{probability, ParamError};
use crate::traits::{HasDensity, Mean, Moment, Sampleable, Support, Variance};

/// [Bernoulli distribution](https://en.wikipedia.org/wiki/Bernoulli_distribution)
/// with success probability `p`. Outcomes are `0.0` and `1.0`.
///
/// # Example
///
/// ```
/// use genmodel::dist::Bernoulli;
/// use genmodel::traits::*;
///
/// let b = Bernoulli::new(0.75).unwrap();
/// assert!((b.f(1.0) - 0.75).abs() < 1E-12);
/// assert_eq!(b.ln_f(0.5), f64::NEG_INFINITY);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Bernoulli {
    p: f64,
}

impl Bernoulli {
    pub fn new(p: f64) -> Result<Self, ParamError> {
        probability("p", p)?;
        Ok(Bernoulli { p })
    }

    #[inline]
    #[must_use]
    pub fn new_unchecked(p: f64) -> Self {
        Bernoulli { p }
    }

    #[inline]
    pub fn p(&self) -> f64 {
        self.p
    }

    /// Probability of failure, 1 - p
    #[inline]
    pub fn q(&self) -> f64 {
        1.0 - self.p
    }
}

impl From<&Bernoulli> for String {
    fn from(b: &Bernoulli) -> String {
        format!("Bernoulli(p: {})", b.p)
    }
}

impl_display!(Bernoulli);

impl HasDensity for Bernoulli {
    fn ln_f(&self, x: f64) -> f64 {
        if x == 1.0 {
            self.p.ln()
        } else if x == 0.0 {
            (-self.p).ln_1p()
        } else {
            f64::NEG_INFINITY
        }
    }
}

impl Sampleable for Bernoulli {
    fn draw<R: Rng>(&self, rng: &mut R) -> f64 {
        let u: f64 = rng.gen();
        if u < self.p {
            1.0
        } else {
            0.0
        }
    }
}

impl Support for Bernoulli {
    fn supports(&self, x: f64) -> bool {
        x == 0.0 || x == 1.0
    }
}

impl Mean for Bernoulli {
    fn mean(&self) -> Option<f64> {
        Some(self.p)
    }
}

impl Variance for Bernoulli {
    fn variance(&self) -> Option<f64> {
        Some(self.p * self.q())
    }
}

impl Moment for Bernoulli {
    fn moment(&self) -> f64 {
        self.p.round()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::misc::mean;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    #[test]
    fn ln_f_of_outcomes() {
        let b = Bernoulli::new(0.3).unwrap();
        assert::close(b.ln_f(1.0), 0.3_f64.ln(), 1E-12);
        assert::close(b.ln_f(0.0), 0.7_f64.ln(), 1E-12);
    }

    #[test]
    fn degenerate_probabilities() {
        let b = Bernoulli::new(1.0).unwrap();
        assert_eq!(b.ln_f(1.0), 0.0);
        assert_eq!(b.ln_f(0.0), f64::NEG_INFINITY);
    }

    #[test]
    fn rejects_out_of_range_p() {
        assert!(Bernoulli::new(1.1).is_err());
        assert!(Bernoulli::new(-0.1).is_err());
        assert!(Bernoulli::new(f64::NAN).is_err());
    }

    #[test]
    fn draw_frequency() {
        let mut rng = Xoshiro256Plus::seed_from_u64(6);
        let b = Bernoulli::new(0.2).unwrap();
        let xs = b.sample(20_000, &mut rng);
        assert::close(mean(&xs), 0.2, 0.01);
    }
}
