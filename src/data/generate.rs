//! Synthetic datasets with known parameters
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fmt;

use super::{DataError, Dataset};
use crate::dist::{Distribution, Family};
use crate::misc::linspace;

/// Noise added around a structural mean
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Noise {
    Normal { sigma: f64 },
    /// Heavy tailed noise, for robust regression
    StudentT { nu: f64, sigma: f64 },
}

impl Noise {
    fn distribution(&self) -> Result<Distribution, DataError> {
        let dist = match *self {
            Noise::Normal { sigma } => Distribution::build(Family::Normal, &[0.0, sigma])?,
            Noise::StudentT { nu, sigma } => {
                Distribution::build(Family::StudentT, &[nu, 0.0, sigma])?
            }
        };
        Ok(dist)
    }

    fn record(&self, truth: &mut Truth) {
        match *self {
            Noise::Normal { sigma } => truth.insert("sigma", sigma),
            Noise::StudentT { nu, sigma } => {
                truth.insert("nu", nu);
                truth.insert("sigma", sigma);
            }
        }
    }
}

/// The parameters a synthetic dataset was generated from
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Truth(BTreeMap<String, f64>);

impl Truth {
    pub fn insert(&mut self, name: &str, value: f64) {
        self.0.insert(name.to_owned(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl fmt::Display for Truth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{k} = {v}")).collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// A generated dataset and the parameters behind it
#[derive(Clone, Debug, PartialEq)]
pub struct Synthetic {
    pub data: Dataset,
    pub truth: Truth,
}

/// A known generative process
pub trait Generator {
    /// Draw `size` observations. The same seed gives the same data.
    fn generate(&self, size: usize, seed: u64) -> Result<Synthetic, DataError>;
}

/// `y = intercept + slope * x + noise` with `x` evenly spaced over `x_range`
///
/// # Example
///
/// ```
/// use genmodel::data::{Generator, LinearProcess, Noise};
///
/// let process = LinearProcess::new(5.0, 2.0, Noise::Normal { sigma: 1.0 });
/// let synth = process.generate(100, 42).unwrap();
/// assert_eq!(synth.data.n_rows(), 100);
/// assert_eq!(synth.truth.get("slope"), Some(2.0));
/// assert_eq!(synth, process.generate(100, 42).unwrap());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearProcess {
    pub intercept: f64,
    pub slope: f64,
    pub x_range: (f64, f64),
    pub noise: Noise,
}

impl LinearProcess {
    /// `x` runs over `[0, 1]`
    pub fn new(intercept: f64, slope: f64, noise: Noise) -> Self {
        LinearProcess {
            intercept,
            slope,
            x_range: (0.0, 1.0),
            noise,
        }
    }

    pub fn with_x_range(self, lower: f64, upper: f64) -> Self {
        Self {
            x_range: (lower, upper),
            ..self
        }
    }
}

impl Generator for LinearProcess {
    fn generate(&self, size: usize, seed: u64) -> Result<Synthetic, DataError> {
        let noise = self.noise.distribution()?;
        let mut rng = Xoshiro256Plus::seed_from_u64(seed);
        let xs = linspace(self.x_range.0, self.x_range.1, size);
        let ys = xs
            .iter()
            .map(|x| self.slope.mul_add(*x, self.intercept) + noise.draw(&mut rng))
            .collect();

        let mut truth = Truth::default();
        truth.insert("intercept", self.intercept);
        truth.insert("slope", self.slope);
        self.noise.record(&mut truth);
        Ok(Synthetic {
            data: Dataset::new(vec![("x", xs), ("y", ys)])?,
            truth,
        })
    }
}

/// `y_t = level + trend * t + amplitude * sin(2 pi t / period) + noise`
/// for `t = 0, 1, ...`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeasonalProcess {
    pub level: f64,
    pub trend: f64,
    pub amplitude: f64,
    pub period: f64,
    pub noise: Noise,
}

impl Generator for SeasonalProcess {
    fn generate(&self, size: usize, seed: u64) -> Result<Synthetic, DataError> {
        if !(self.period > 0.0) {
            return Err(crate::dist::ParamError::NotPositive {
                name: "period",
                value: self.period,
            }
            .into());
        }
        let noise = self.noise.distribution()?;
        let mut rng = Xoshiro256Plus::seed_from_u64(seed);
        let ts: Vec<f64> = (0..size).map(|t| t as f64).collect();
        let ys = ts
            .iter()
            .map(|t| {
                let season = self.amplitude * (2.0 * PI * t / self.period).sin();
                self.trend.mul_add(*t, self.level) + season + noise.draw(&mut rng)
            })
            .collect();

        let mut truth = Truth::default();
        truth.insert("level", self.level);
        truth.insert("trend", self.trend);
        truth.insert("amplitude", self.amplitude);
        truth.insert("period", self.period);
        self.noise.record(&mut truth);
        Ok(Synthetic {
            data: Dataset::new(vec![("t", ts), ("y", ys)])?,
            truth,
        })
    }
}

/// `y_t = c + rho * y_{t-1} + noise`, started from the stationary mean
/// `c / (1 - rho)` when `|rho| < 1` and from `c` otherwise
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ar1Process {
    pub c: f64,
    pub rho: f64,
    pub noise: Noise,
}

impl Generator for Ar1Process {
    fn generate(&self, size: usize, seed: u64) -> Result<Synthetic, DataError> {
        let noise = self.noise.distribution()?;
        let mut rng = Xoshiro256Plus::seed_from_u64(seed);
        let mut y = if self.rho.abs() < 1.0 {
            self.c / (1.0 - self.rho)
        } else {
            self.c
        };
        let ys: Vec<f64> = (0..size)
            .map(|_| {
                y = self.rho.mul_add(y, self.c) + noise.draw(&mut rng);
                y
            })
            .collect();

        let mut truth = Truth::default();
        truth.insert("c", self.c);
        truth.insert("rho", self.rho);
        self.noise.record(&mut truth);
        Ok(Synthetic {
            data: Dataset::new(vec![("t", (0..size).map(|t| t as f64).collect()), ("y", ys)])?,
            truth,
        })
    }
}

/// Uniform draws in `[lower, upper)`, a helper for covariates
pub fn uniform_covariate<R: Rng>(n: usize, lower: f64, upper: f64, rng: &mut R) -> Vec<f64> {
    (0..n).map(|_| rng.gen_range(lower..upper)).collect()
}
