//! Cauchy distribution over x in (-∞, ∞)
use rand::Rng;
use std::f64::consts::PI;

use super::{finite, positive, ParamError};
use crate::consts::LN_PI;
use crate::traits::{HasDensity, Moment, Sampleable, Support};

/// [Cauchy distribution](https://en.wikipedia.org/wiki/Cauchy_distribution)
/// with location `alpha` and scale `beta`.
#[derive(Debug, Clone, PartialEq)]
pub struct Cauchy {
    alpha: f64,
    beta: f64,
}

impl Cauchy {
    pub fn new(alpha: f64, beta: f64) -> Result<Self, ParamError> {
        finite("alpha", alpha)?;
        positive("beta", beta)?;
        Ok(Cauchy { alpha, beta })
    }

    #[inline]
    #[must_use]
    pub fn new_unchecked(alpha: f64, beta: f64) -> Self {
        Cauchy { alpha, beta }
    }

    /// Location
    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Scale
    #[inline]
    pub fn beta(&self) -> f64 {
        self.beta
    }
}

impl From<&Cauchy> for String {
    fn from(c: &Cauchy) -> String {
        format!("Cauchy(α: {}, β: {})", c.alpha, c.beta)
    }
}

impl_display!(Cauchy);

impl HasDensity for Cauchy {
    fn ln_f(&self, x: f64) -> f64 {
        let z = (x - self.alpha) / self.beta;
        -LN_PI - self.beta.ln() - z.mul_add(z, 1.0).ln()
    }
}

impl Sampleable for Cauchy {
    fn draw<R: Rng>(&self, rng: &mut R) -> f64 {
        let u: f64 = rng.gen();
        self.beta.mul_add((PI * (u - 0.5)).tan(), self.alpha)
    }
}

impl Support for Cauchy {
    fn supports(&self, x: f64) -> bool {
        x.is_finite()
    }
}

impl Moment for Cauchy {
    fn moment(&self) -> f64 {
        self.alpha
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
        let c = Cauchy::new(0.0, 1.0).unwrap();
        assert::close(c.ln_f(1.0), -1.837_877_066_409_345_3, 1E-12);
    }

    #[test]
    fn median_of_draws_is_location() {
        let mut rng = Xoshiro256Plus::seed_from_u64(5);
        let c = Cauchy::new(2.0, 0.5).unwrap();
        let xs = c.sample(10_000, &mut rng);
        assert::close(quantile(&xs, 0.5), 2.0, 0.05);
        assert::close(quantile(&xs, 0.75) - quantile(&xs, 0.25), 1.0, 0.1);
    }
}
