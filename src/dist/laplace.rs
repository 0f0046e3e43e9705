//! Laplace (double exponential) distribution over x in (-∞, ∞)
use rand::Rng;
use std::f64::consts::LN_2;

use super::{finite, positive, ParamError};
use crate::traits::{HasDensity, Mean, Moment, Sampleable, Support, Variance};

/// [Laplace distribution](https://en.wikipedia.org/wiki/Laplace_distribution)
/// with location `mu` and scale `b`.
#[derive(Debug, Clone, PartialEq)]
pub struct Laplace {
    mu: f64,
    b: f64,
}

impl Laplace {
    pub fn new(mu: f64, b: f64) -> Result<Self, ParamError> {
        finite("mu", mu)?;
        positive("b", b)?;
        Ok(Laplace { mu, b })
    }

    #[inline]
    #[must_use]
    pub fn new_unchecked(mu: f64, b: f64) -> Self {
        Laplace { mu, b }
    }

    #[inline]
    pub fn mu(&self) -> f64 {
        self.mu
    }

    #[inline]
    pub fn b(&self) -> f64 {
        self.b
    }
}

impl From<&Laplace> for String {
    fn from(l: &Laplace) -> String {
        format!("Laplace(μ: {}, b: {})", l.mu, l.b)
    }
}

impl_display!(Laplace);

impl HasDensity for Laplace {
    fn ln_f(&self, x: f64) -> f64 {
        -(x - self.mu).abs() / self.b - self.b.ln() - LN_2
    }
}

impl Sampleable for Laplace {
    fn draw<R: Rng>(&self, rng: &mut R) -> f64 {
        // inverse cdf on u in (-1/2, 1/2)
        let u: f64 = rng.gen::<f64>() - 0.5;
        self.mu - self.b * u.signum() * 2.0_f64.mul_add(-u.abs(), 1.0).ln()
    }
}

impl Support for Laplace {
    fn supports(&self, x: f64) -> bool {
        x.is_finite()
    }
}

impl Mean for Laplace {
    fn mean(&self) -> Option<f64> {
        Some(self.mu)
    }
}

impl Variance for Laplace {
    fn variance(&self) -> Option<f64> {
        Some(2.0 * self.b * self.b)
    }
}

impl Moment for Laplace {
    fn moment(&self) -> f64 {
        self.mu
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
        let l = Laplace::new(1.0, 2.0).unwrap();
        assert::close(l.ln_f(3.0), -2.386_294_361_119_891, 1E-12);
    }

    #[test]
    fn ln_f_is_symmetric() {
        let l = Laplace::new(1.0, 0.5).unwrap();
        assert::close(l.ln_f(0.2), l.ln_f(1.8), 1E-12);
    }

    #[test]
    fn sample_moments() {
        let mut rng = Xoshiro256Plus::seed_from_u64(17);
        let l = Laplace::new(-1.0, 0.5).unwrap();
        let xs = l.sample(20_000, &mut rng);
        assert::close(mean(&xs), -1.0, 0.02);
        assert::close(variance(&xs, 1), 0.5, 0.03);
    }
}
