//! Half-Cauchy distribution over x in [0, ∞)
use rand::Rng;
use std::f64::consts::{FRAC_PI_2, LN_2};

use super::{positive, ParamError};
use crate::consts::LN_PI;
use crate::traits::{HasDensity, Moment, Sampleable, Support};

/// Half-Cauchy with scale `beta`, a heavy tailed prior for scales
#[derive(Debug, Clone, PartialEq)]
pub struct HalfCauchy {
    beta: f64,
}

impl HalfCauchy {
    pub fn new(beta: f64) -> Result<Self, ParamError> {
        positive("beta", beta)?;
        Ok(HalfCauchy { beta })
    }

    #[inline]
    #[must_use]
    pub fn new_unchecked(beta: f64) -> Self {
        HalfCauchy { beta }
    }

    #[inline]
    pub fn beta(&self) -> f64 {
        self.beta
    }
}

impl From<&HalfCauchy> for String {
    fn from(c: &HalfCauchy) -> String {
        format!("HalfCauchy(β: {})", c.beta)
    }
}

impl_display!(HalfCauchy);

impl HasDensity for HalfCauchy {
    fn ln_f(&self, x: f64) -> f64 {
        if x < 0.0 {
            return f64::NEG_INFINITY;
        }
        let z = x / self.beta;
        LN_2 - LN_PI - self.beta.ln() - z.mul_add(z, 1.0).ln()
    }
}

impl Sampleable for HalfCauchy {
    fn draw<R: Rng>(&self, rng: &mut R) -> f64 {
        let u: f64 = rng.gen();
        self.beta * (FRAC_PI_2 * u).tan()
    }
}

impl Support for HalfCauchy {
    fn supports(&self, x: f64) -> bool {
        x >= 0.0 && x.is_finite()
    }
}

impl Moment for HalfCauchy {
    fn moment(&self) -> f64 {
        self.beta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::misc::quantile;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    #[test]
    fn ln_f_known_value() {
        let c = HalfCauchy::new(2.0).unwrap();
        assert::close(c.ln_f(2.0), -1.837_877_066_409_345_3, 1E-12);
        assert_eq!(c.ln_f(-1.0), f64::NEG_INFINITY);
    }

    #[test]
    fn median_of_draws_is_beta() {
        let mut rng = Xoshiro256Plus::seed_from_u64(9);
        let c = HalfCauchy::new(1.5).unwrap();
        let xs = c.sample(10_000, &mut rng);
        assert!(xs.iter().all(|&x| x >= 0.0));
        assert::close(quantile(&xs, 0.5), 1.5, 0.1);
    }
}
