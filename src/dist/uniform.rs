//! Continuous uniform distribution over x in [lower, upper]
use rand::Rng;

use super::{finite, ParamError};
use crate::traits::{HasDensity, Mean, Moment, Sampleable, Support, Variance};

/// [Continuous uniform](https://en.wikipedia.org/wiki/Uniform_distribution_(continuous))
/// U(lower, upper).
#[derive(Debug, Clone, PartialEq)]
pub struct Uniform {
    lower: f64,
    upper: f64,
}

impl Uniform {
    pub fn new(lower: f64, upper: f64) -> Result<Self, ParamError> {
        finite("lower", lower)?;
        finite("upper", upper)?;
        if lower < upper {
            Ok(Uniform { lower, upper })
        } else {
            Err(ParamError::InvertedBounds { lower, upper })
        }
    }

    #[inline]
    #[must_use]
    pub fn new_unchecked(lower: f64, upper: f64) -> Self {
        Uniform { lower, upper }
    }

    #[inline]
    pub fn lower(&self) -> f64 {
        self.lower
    }

    #[inline]
    pub fn upper(&self) -> f64 {
        self.upper
    }
}

impl Default for Uniform {
    fn default() -> Self {
        Uniform::new_unchecked(0.0, 1.0)
    }
}

impl From<&Uniform> for String {
    fn from(u: &Uniform) -> String {
        format!("U({}, {})", u.lower, u.upper)
    }
}

impl_display!(Uniform);

impl HasDensity for Uniform {
    fn ln_f(&self, x: f64) -> f64 {
        if self.lower <= x && x <= self.upper {
            -(self.upper - self.lower).ln()
        } else {
            f64::NEG_INFINITY
        }
    }
}

impl Sampleable for Uniform {
    fn draw<R: Rng>(&self, rng: &mut R) -> f64 {
        let u: f64 = rng.gen();
        (self.upper - self.lower).mul_add(u, self.lower)
    }
}

impl Support for Uniform {
    fn supports(&self, x: f64) -> bool {
        self.lower <= x && x <= self.upper
    }
}

impl Mean for Uniform {
    fn mean(&self) -> Option<f64> {
        Some((self.upper + self.lower) / 2.0)
    }
}

impl Variance for Uniform {
    fn variance(&self) -> Option<f64> {
        let w = self.upper - self.lower;
        Some(w * w / 12.0)
    }
}

impl Moment for Uniform {
    fn moment(&self) -> f64 {
        (self.upper + self.lower) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    #[test]
    fn ln_f_is_flat_inside() {
        let u = Uniform::new(-1.0, 2.0).unwrap();
        assert::close(u.ln_f(0.5), -(3.0_f64.ln()), 1E-12);
        assert::close(u.ln_f(1.9), -(3.0_f64.ln()), 1E-12);
        assert_eq!(u.ln_f(2.5), f64::NEG_INFINITY);
    }

    #[test]
    fn rejects_inverted_bounds() {
        assert_eq!(
            Uniform::new(1.0, 1.0),
            Err(ParamError::InvertedBounds {
                lower: 1.0,
                upper: 1.0
            })
        );
    }

    #[test]
    fn draws_stay_in_bounds() {
        let mut rng = Xoshiro256Plus::seed_from_u64(12);
        let u = Uniform::new(3.0, 4.0).unwrap();
        assert!(u.sample(1000, &mut rng).iter().all(|&x| u.supports(x)));
    }
}
