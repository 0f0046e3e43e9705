//! Trait definitions
use rand::Rng;

/// A density (or mass) function over real-valued points.
///
/// Discrete families store their support as `f64` integers and return
/// `f64::NEG_INFINITY` for anything that is not an integer in the support.
pub trait HasDensity {
    /// Normalized log probability density / mass at `x`
    ///
    /// # Example
    ///
    /// ```
    /// use genmodel::dist::Gaussian;
    /// use genmodel::traits::*;
    ///
    /// let g = Gaussian::standard();
    /// assert!(g.ln_f(0.0) > g.ln_f(0.1));
    /// assert!(g.ln_f(0.0) > g.ln_f(-0.1));
    /// ```
    fn ln_f(&self, x: f64) -> f64;

    /// Probability density / mass at `x`
    fn f(&self, x: f64) -> f64 {
        self.ln_f(x).exp()
    }
}

/// Something that can be drawn from.
pub trait Sampleable {
    /// Single draw
    ///
    /// # Example
    ///
    /// ```
    /// use genmodel::dist::Bernoulli;
    /// use genmodel::traits::*;
    ///
    /// let b = Bernoulli::new(0.5).unwrap();
    /// let mut rng = rand::thread_rng();
    /// let x = b.draw(&mut rng);
    /// assert!(x == 0.0 || x == 1.0);
    /// ```
    fn draw<R: Rng>(&self, rng: &mut R) -> f64;

    /// Multiple independent draws
    fn sample<R: Rng>(&self, n: usize, rng: &mut R) -> Vec<f64> {
        (0..n).map(|_| self.draw(rng)).collect()
    }
}

/// Identifies the support of a distribution
pub trait Support {
    /// Returns `true` if `x` is in the support
    fn supports(&self, x: f64) -> bool;
}

/// Random variable: a density that can also be drawn from
pub trait Rv: HasDensity + Sampleable {}

impl<T> Rv for T where T: HasDensity + Sampleable {}

/// Distributions with a defined mean
pub trait Mean {
    fn mean(&self) -> Option<f64>;
}

/// Distributions with a defined variance
pub trait Variance {
    fn variance(&self) -> Option<f64>;
}

/// A finite point in the support that sits near the bulk of the mass.
///
/// Used to place the starting point of inference: the mean when it exists,
/// otherwise the location or median.
pub trait Moment {
    fn moment(&self) -> f64;
}
