//! Student's t distribution over x in (-∞, ∞)
use rand::Rng;
use rand_distr::StudentT as RStudentT;

use super::{finite, positive, ParamError};
use crate::consts::LN_PI;
use crate::misc::ln_gammafn;
use crate::traits::{HasDensity, Mean, Moment, Sampleable, Support, Variance};

/// Location-scale [Student's t](https://en.wikipedia.org/wiki/Student%27s_t-distribution)
/// with `nu` degrees of freedom. Used for robust likelihoods.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentsT {
    /// Degrees of freedom, ν, in (0, ∞)
    nu: f64,
    /// Location
    mu: f64,
    /// Scale
    sigma: f64,
}

impl StudentsT {
    pub fn new(nu: f64, mu: f64, sigma: f64) -> Result<Self, ParamError> {
        positive("nu", nu)?;
        finite("mu", mu)?;
        positive("sigma", sigma)?;
        Ok(StudentsT { nu, mu, sigma })
    }

    #[inline]
    #[must_use]
    pub fn new_unchecked(nu: f64, mu: f64, sigma: f64) -> Self {
        StudentsT { nu, mu, sigma }
    }

    #[inline]
    pub fn nu(&self) -> f64 {
        self.nu
    }

    #[inline]
    pub fn mu(&self) -> f64 {
        self.mu
    }

    #[inline]
    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl From<&StudentsT> for String {
    fn from(t: &StudentsT) -> String {
        format!("Student's t(ν: {}, μ: {}, σ: {})", t.nu, t.mu, t.sigma)
    }
}

impl_display!(StudentsT);

impl HasDensity for StudentsT {
    fn ln_f(&self, x: f64) -> f64 {
        let z = (x - self.mu) / self.sigma;
        let half_nu_p1 = (self.nu + 1.0) / 2.0;
        ln_gammafn(half_nu_p1)
            - ln_gammafn(self.nu / 2.0)
            - 0.5 * (self.nu.ln() + LN_PI)
            - self.sigma.ln()
            - half_nu_p1 * (z * z / self.nu).ln_1p()
    }
}

impl Sampleable for StudentsT {
    fn draw<R: Rng>(&self, rng: &mut R) -> f64 {
        match RStudentT::new(self.nu) {
            Ok(t) => self.sigma.mul_add(rng.sample(t), self.mu),
            Err(_) => f64::NAN,
        }
    }
}

impl Support for StudentsT {
    fn supports(&self, x: f64) -> bool {
        x.is_finite()
    }
}

impl Mean for StudentsT {
    fn mean(&self) -> Option<f64> {
        if self.nu > 1.0 {
            Some(self.mu)
        } else {
            None
        }
    }
}

impl Variance for StudentsT {
    fn variance(&self) -> Option<f64> {
        if self.nu > 2.0 {
            Some(self.sigma * self.sigma * self.nu / (self.nu - 2.0))
        } else {
            None
        }
    }
}

impl Moment for StudentsT {
    fn moment(&self) -> f64 {
        self.mu
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::misc::quantile;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    const TOL: f64 = 1E-12;

    #[test]
    fn ln_f_known_value() {
        let t = StudentsT::new(3.0, 1.0, 2.0).unwrap();
        assert::close(t.ln_f(2.0), -1.854_121_445_530_527_7, TOL);
    }

    #[test]
    fn approaches_normal_for_large_nu() {
        let t = StudentsT::new(1E7, 0.0, 1.0).unwrap();
        let g = crate::dist::Gaussian::standard();
        assert::close(t.ln_f(0.5), g.ln_f(0.5), 1E-6);
    }

    #[test]
    fn mean_undefined_for_small_nu() {
        assert!(StudentsT::new(1.0, 0.0, 1.0).unwrap().mean().is_none());
        assert!(StudentsT::new(2.0, 0.0, 1.0).unwrap().variance().is_none());
    }

    #[test]
    fn draws_are_centered_on_mu() {
        let mut rng = Xoshiro256Plus::seed_from_u64(11);
        let t = StudentsT::new(4.0, -3.0, 0.5).unwrap();
        let xs = t.sample(10_000, &mut rng);
        assert::close(quantile(&xs, 0.5), -3.0, 0.05);
    }
}
