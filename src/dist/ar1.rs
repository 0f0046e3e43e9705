//! First order autoregressive process
use rand::Rng;
use rand_distr::StandardNormal;

use super::{finite, positive, ParamError};
use crate::consts::HALF_LN_2PI;
use crate::traits::Moment;

/// Zero-mean AR(1) process
///
/// x₀ ~ N(0, σ / √(1 - ρ²)) when |ρ| < 1, otherwise x₀ ~ N(0, σ), and
/// x_t ~ N(ρ x_{t-1}, σ) after that.
///
/// AR(1) is a density over whole sequences, so it exposes
/// [`ln_f_seq`](Ar1::ln_f_seq) and [`draw_seq`](Ar1::draw_seq) instead of
/// the scalar traits.
///
/// # Example
///
/// ```
/// use genmodel::dist::Ar1;
///
/// let ar = Ar1::new(0.9, 1.0).unwrap();
/// let smooth = ar.ln_f_seq(&[0.0, 0.1, 0.2, 0.25]);
/// let jumpy = ar.ln_f_seq(&[0.0, 2.0, -2.0, 2.0]);
/// assert!(smooth > jumpy);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Ar1 {
    rho: f64,
    sigma: f64,
}

impl Ar1 {
    pub fn new(rho: f64, sigma: f64) -> Result<Self, ParamError> {
        finite("rho", rho)?;
        positive("sigma", sigma)?;
        Ok(Ar1 { rho, sigma })
    }

    #[inline]
    #[must_use]
    pub fn new_unchecked(rho: f64, sigma: f64) -> Self {
        Ar1 { rho, sigma }
    }

    #[inline]
    pub fn rho(&self) -> f64 {
        self.rho
    }

    #[inline]
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Standard deviation of the first element
    pub fn initial_sigma(&self) -> f64 {
        if self.rho.abs() < 1.0 {
            self.sigma / self.rho.mul_add(-self.rho, 1.0).sqrt()
        } else {
            self.sigma
        }
    }

    /// Joint log density of a whole sequence. An empty sequence has log
    /// density zero.
    pub fn ln_f_seq(&self, xs: &[f64]) -> f64 {
        let Some((&x0, _)) = xs.split_first() else {
            return 0.0;
        };
        let s0 = self.initial_sigma();
        let z0 = x0 / s0;
        let mut lp = -0.5 * z0 * z0 - s0.ln() - HALF_LN_2PI;

        let ln_sigma = self.sigma.ln();
        lp += xs
            .windows(2)
            .map(|w| {
                let z = (w[1] - self.rho * w[0]) / self.sigma;
                -0.5 * z * z - ln_sigma - HALF_LN_2PI
            })
            .sum::<f64>();
        lp
    }

    /// Draw a sequence of length `n`
    pub fn draw_seq<R: Rng>(&self, n: usize, rng: &mut R) -> Vec<f64> {
        let mut xs = Vec::with_capacity(n);
        let mut prev = 0.0;
        for t in 0..n {
            let z: f64 = rng.sample(StandardNormal);
            let x = if t == 0 {
                self.initial_sigma() * z
            } else {
                self.sigma.mul_add(z, self.rho * prev)
            };
            xs.push(x);
            prev = x;
        }
        xs
    }
}

impl From<&Ar1> for String {
    fn from(ar: &Ar1) -> String {
        format!("AR1(ρ: {}, σ: {})", ar.rho, ar.sigma)
    }
}

impl_display!(Ar1);

impl Moment for Ar1 {
    fn moment(&self) -> f64 {
        0.0
    }
}
