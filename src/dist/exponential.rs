//! Exponential distribution over x in [0, ∞)
use rand::Rng;
use rand_distr::Exp1;

use super::{positive, ParamError};
use crate::traits::{HasDensity, Mean, Moment, Sampleable, Support, Variance};

/// [Exponential distribution](https://en.wikipedia.org/wiki/Exponential_distribution)
/// with rate `lam`.
///
/// # Example
///
/// ```
/// use genmodel::dist::Exponential;
/// use genmodel::traits::*;
///
/// let expon = Exponential::new(2.0).unwrap();
/// assert_eq!(expon.mean(), Some(0.5));
/// assert_eq!(expon.ln_f(-1.0), f64::NEG_INFINITY);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Exponential {
    rate: f64,
}

impl Exponential {
    pub fn new(rate: f64) -> Result<Self, ParamError> {
        positive("lam", rate)?;
        Ok(Exponential { rate })
    }

    #[inline]
    #[must_use]
    pub fn new_unchecked(rate: f64) -> Self {
        Exponential { rate }
    }

    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl From<&Exponential> for String {
    fn from(expon: &Exponential) -> String {
        format!("Expon(λ: {})", expon.rate)
    }
}

impl_display!(Exponential);

impl HasDensity for Exponential {
    fn ln_f(&self, x: f64) -> f64 {
        if x < 0.0 {
            f64::NEG_INFINITY
        } else {
            self.rate.mul_add(-x, self.rate.ln())
        }
    }
}

impl Sampleable for Exponential {
    fn draw<R: Rng>(&self, rng: &mut R) -> f64 {
        let e: f64 = rng.sample(Exp1);
        e / self.rate
    }
}

impl Support for Exponential {
    fn supports(&self, x: f64) -> bool {
        x >= 0.0 && x.is_finite()
    }
}

impl Mean for Exponential {
    fn mean(&self) -> Option<f64> {
        Some(self.rate.recip())
    }
}

impl Variance for Exponential {
    fn variance(&self) -> Option<f64> {
        Some((self.rate * self.rate).recip())
    }
}

impl Moment for Exponential {
    fn moment(&self) -> f64 {
        self.rate.recip()
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
        let expon = Exponential::new(2.0).unwrap();
        assert::close(expon.ln_f(1.5), -2.306_852_819_440_054_6, 1E-12);
    }

    #[test]
    fn rejects_non_positive_rate() {
        assert!(Exponential::new(0.0).is_err());
        assert!(Exponential::new(-2.0).is_err());
    }

    #[test]
    fn sample_mean() {
        let mut rng = Xoshiro256Plus::seed_from_u64(1);
        let expon = Exponential::new(4.0).unwrap();
        let xs = expon.sample(20_000, &mut rng);
        assert::close(mean(&xs), 0.25, 0.01);
    }
}
