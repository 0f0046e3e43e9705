//! Half-normal distribution over x in [0, ∞)
use rand::Rng;
use rand_distr::StandardNormal;
use std::f64::consts::{FRAC_2_PI, PI};

use super::{positive, ParamError};
use crate::consts::HALF_LN_PI_OVER_2;
use crate::traits::{HasDensity, Mean, Moment, Sampleable, Support, Variance};

/// Half-normal distribution, the absolute value of N(0, σ). The usual
/// weakly informative prior for scale parameters.
#[derive(Debug, Clone)]
pub struct HalfNormal {
    sigma: f64,
    /// Cached ln(sigma)
    ln_sigma: f64,
}

impl PartialEq for HalfNormal {
    fn eq(&self, other: &HalfNormal) -> bool {
        self.sigma == other.sigma
    }
}

impl HalfNormal {
    /// Create a new half-normal with scale `sigma`
    pub fn new(sigma: f64) -> Result<Self, ParamError> {
        positive("sigma", sigma)?;
        Ok(Self::new_unchecked(sigma))
    }

    #[inline]
    #[must_use]
    pub fn new_unchecked(sigma: f64) -> Self {
        HalfNormal {
            sigma,
            ln_sigma: sigma.ln(),
        }
    }

    #[inline]
    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl From<&HalfNormal> for String {
    fn from(hn: &HalfNormal) -> String {
        format!("HalfNormal(σ: {})", hn.sigma)
    }
}

impl_display!(HalfNormal);

impl HasDensity for HalfNormal {
    fn ln_f(&self, x: f64) -> f64 {
        if x < 0.0 {
            return f64::NEG_INFINITY;
        }
        let k = x / self.sigma;
        -0.5 * k * k - self.ln_sigma - HALF_LN_PI_OVER_2
    }
}

impl Sampleable for HalfNormal {
    fn draw<R: Rng>(&self, rng: &mut R) -> f64 {
        let z: f64 = rng.sample(StandardNormal);
        (self.sigma * z).abs()
    }
}

impl Support for HalfNormal {
    fn supports(&self, x: f64) -> bool {
        x >= 0.0 && x.is_finite()
    }
}

impl Mean for HalfNormal {
    fn mean(&self) -> Option<f64> {
        Some(self.sigma * FRAC_2_PI.sqrt())
    }
}

impl Variance for HalfNormal {
    fn variance(&self) -> Option<f64> {
        Some(self.sigma * self.sigma * (1.0 - 2.0 / PI))
    }
}

impl Moment for HalfNormal {
    fn moment(&self) -> f64 {
        self.sigma
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::misc::mean;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    const TOL: f64 = 1E-12;

    #[test]
    fn ln_f_known_value() {
        let hn = HalfNormal::new(2.0).unwrap();
        assert::close(hn.ln_f(1.0), -1.043_938_533_204_672_7, TOL);
    }

    #[test]
    fn ln_f_is_twice_the_normal_density() {
        let hn = HalfNormal::new(1.5).unwrap();
        let g = crate::dist::Gaussian::new(0.0, 1.5).unwrap();
        assert::close(hn.ln_f(0.7), g.ln_f(0.7) + 2.0_f64.ln(), TOL);
    }

    #[test]
    fn negative_values_have_zero_density() {
        let hn = HalfNormal::new(1.0).unwrap();
        assert_eq!(hn.ln_f(-0.1), f64::NEG_INFINITY);
        assert!(!hn.supports(-0.1));
    }

    #[test]
    fn draws_are_non_negative_with_expected_mean() {
        let mut rng = Xoshiro256Plus::seed_from_u64(3);
        let hn = HalfNormal::new(2.0).unwrap();
        let xs = hn.sample(20_000, &mut rng);
        assert!(xs.iter().all(|&x| x >= 0.0));
        assert::close(mean(&xs), hn.mean().unwrap(), 0.05);
    }
}
