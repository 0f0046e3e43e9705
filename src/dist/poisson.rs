//! Poisson distribution over non-negative integers
use rand::Rng;
use rand_distr::Poisson as RPoisson;

use super::{is_count, non_negative, xlny, ParamError};
use crate::misc::ln_gammafn;
use crate::traits::{HasDensity, Mean, Moment, Sampleable, Support, Variance};

/// [Poisson distribution](https://en.wikipedia.org/wiki/Poisson_distribution)
/// with rate `mu`.
///
/// # Example
///
/// ```
/// use genmodel::dist::Poisson;
/// use genmodel::traits::*;
///
/// let pois = Poisson::new(2.0).unwrap();
/// assert_eq!(pois.mean(), Some(2.0));
/// assert_eq!(pois.ln_f(1.5), f64::NEG_INFINITY);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Poisson {
    rate: f64,
}

impl Poisson {
    pub fn new(rate: f64) -> Result<Self, ParamError> {
        non_negative("mu", rate)?;
        Ok(Poisson { rate })
    }

    #[inline]
    #[must_use]
    pub fn new_unchecked(rate: f64) -> Self {
        Poisson { rate }
    }

    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl From<&Poisson> for String {
    fn from(pois: &Poisson) -> String {
        format!("Poisson(λ: {})", pois.rate)
    }
}

impl_display!(Poisson);

impl HasDensity for Poisson {
    fn ln_f(&self, k: f64) -> f64 {
        if !is_count(k) {
            return f64::NEG_INFINITY;
        }
        xlny(k, self.rate) - self.rate - ln_gammafn(k + 1.0)
    }
}

impl Sampleable for Poisson {
    fn draw<R: Rng>(&self, rng: &mut R) -> f64 {
        if self.rate == 0.0 {
            return 0.0;
        }
        match RPoisson::new(self.rate) {
            Ok(p) => rng.sample(p),
            Err(_) => f64::NAN,
        }
    }
}

impl Support for Poisson {
    fn supports(&self, k: f64) -> bool {
        is_count(k)
    }
}

impl Mean for Poisson {
    fn mean(&self) -> Option<f64> {
        Some(self.rate)
    }
}

impl Variance for Poisson {
    fn variance(&self) -> Option<f64> {
        Some(self.rate)
    }
}

impl Moment for Poisson {
    fn moment(&self) -> f64 {
        self.rate.floor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::misc::{mean, variance};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    #[test]
    fn ln_f_known_value() {
        let pois = Poisson::new(2.5).unwrap();
        assert::close(pois.ln_f(3.0), -1.542_887_273_605_59, 1E-10);
    }

    #[test]
    fn zero_rate_puts_all_mass_on_zero() {
        let pois = Poisson::new(0.0).unwrap();
        assert_eq!(pois.ln_f(0.0), 0.0);
        let mut rng = Xoshiro256Plus::seed_from_u64(0);
        assert_eq!(pois.draw(&mut rng), 0.0);
    }

    #[test]
    fn sample_moments() {
        let mut rng = Xoshiro256Plus::seed_from_u64(19);
        let pois = Poisson::new(3.5).unwrap();
        let xs = pois.sample(20_000, &mut rng);
        assert!(xs.iter().all(|&k| is_count(k)));
        assert::close(mean(&xs), 3.5, 0.05);
        assert::close(variance(&xs, 1), 3.5, 0.15);
    }
}
