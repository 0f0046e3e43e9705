//! Maps between a family's support and the real line
//!
//! Samplers and optimizers work on unconstrained coordinates. Each prior
//! element is pushed through the transform implied by its family's
//! [`Domain`] and the log absolute Jacobian of the inverse map is added to
//! the joint density.
use crate::dist::Domain;
use crate::misc::{ln_sigmoid, logit, sigmoid};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transform {
    Identity,
    /// (0, ∞) ↔ ℝ
    Log,
    /// (0, 1) ↔ ℝ
    Logit,
    /// (lower, upper) ↔ ℝ
    Interval { lower: f64, upper: f64 },
}

impl Transform {
    /// The transform for an element of a family with the given domain.
    /// `params` are the element's parameter values, which carry the
    /// bounds of bounded families.
    pub fn for_domain(domain: Domain, params: &[f64]) -> Self {
        match domain {
            Domain::Real | Domain::Count | Domain::Binary => Transform::Identity,
            Domain::Positive => Transform::Log,
            Domain::UnitInterval => Transform::Logit,
            Domain::Bounded { lower, upper } => Transform::Interval {
                lower: params[lower],
                upper: params[upper],
            },
        }
    }

    /// Constrained to unconstrained
    pub fn forward(&self, x: f64) -> f64 {
        match self {
            Transform::Identity => x,
            Transform::Log => x.ln(),
            Transform::Logit => logit(x),
            Transform::Interval { lower, upper } => {
                logit((x - lower) / (upper - lower))
            }
        }
    }

    /// Unconstrained to constrained
    pub fn backward(&self, y: f64) -> f64 {
        match self {
            Transform::Identity => y,
            Transform::Log => y.exp(),
            Transform::Logit => sigmoid(y),
            Transform::Interval { lower, upper } => {
                (upper - lower).mul_add(sigmoid(y), *lower)
            }
        }
    }

    /// ln |d backward(y) / dy|
    pub fn ln_jacobian(&self, y: f64) -> f64 {
        match self {
            Transform::Identity => 0.0,
            Transform::Log => y,
            Transform::Logit => ln_sigmoid(y) + ln_sigmoid(-y),
            Transform::Interval { lower, upper } => {
                (upper - lower).ln() + ln_sigmoid(y) + ln_sigmoid(-y)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1E-10;

    fn transforms() -> [Transform; 4] {
        [
            Transform::Identity,
            Transform::Log,
            Transform::Logit,
            Transform::Interval {
                lower: -2.0,
                upper: 5.0,
            },
        ]
    }

    #[test]
    fn backward_inverts_forward() {
        let points = [0.3, 0.3, 0.3, 1.7];
        for (t, x) in transforms().iter().zip(points) {
            assert::close(t.backward(t.forward(x)), x, TOL);
        }
    }

    #[test]
    fn backward_lands_in_support() {
        let interval = Transform::Interval {
            lower: -2.0,
            upper: 5.0,
        };
        for y in [-30.0, -1.0, 0.0, 2.0, 30.0] {
            assert!(Transform::Log.backward(y) > 0.0);
            let p = Transform::Logit.backward(y);
            assert!((0.0..=1.0).contains(&p));
            let z = interval.backward(y);
            assert!((-2.0..=5.0).contains(&z));
        }
    }

    #[test]
    fn ln_jacobian_matches_numerical_derivative() {
        let h = 1E-6;
        for t in transforms() {
            for y in [-1.3, 0.0, 0.8] {
                let dx = (t.backward(y + h) - t.backward(y - h)) / (2.0 * h);
                assert::close(t.ln_jacobian(y), dx.abs().ln(), 1E-6);
            }
        }
    }

    #[test]
    fn domain_picks_transform() {
        assert_eq!(Transform::for_domain(Domain::Real, &[]), Transform::Identity);
        assert_eq!(Transform::for_domain(Domain::Positive, &[]), Transform::Log);
        assert_eq!(
            Transform::for_domain(Domain::Bounded { lower: 0, upper: 1 }, &[1.0, 3.0]),
            Transform::Interval {
                lower: 1.0,
                upper: 3.0
            }
        );
    }
}
