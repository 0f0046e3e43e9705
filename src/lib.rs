//! Declarative generative models with MCMC and variational inference.
//!
//! The workflow has four parts:
//!
//! 1. [`data`]: load or generate a [`Dataset`](data::Dataset)
//! 2. [`model`]: declare priors, deterministics and likelihoods on a
//!    [`Model`](model::Model)
//! 3. [`inference`]: fit the model with an
//!    [`InferenceEngine`](inference::InferenceEngine)
//! 4. [`diagnostics`] and [`predictive`]: summarize the posterior and push it
//!    back through the likelihood
//!
//! # Example
//!
//! ```no_run
//! use genmodel::prelude::*;
//!
//! let xs: Vec<f64> = (0..50).map(|i| f64::from(i) / 10.0).collect();
//! let ys: Vec<f64> = xs.iter().map(|x| 1.0 + 2.0 * x).collect();
//!
//! let mut model = Model::new();
//! model.add_coord_len("obs", xs.len()).unwrap();
//! let x = model.add_data("x", xs, &["obs"]).unwrap();
//! let a = model.add_prior("a", DistSpec::normal(0.0, 10.0), &[]).unwrap();
//! let b = model.add_prior("b", DistSpec::normal(0.0, 10.0), &[]).unwrap();
//! let sigma = model.add_prior("sigma", DistSpec::half_normal(1.0), &[]).unwrap();
//! model
//!     .add_likelihood("y", DistSpec::normal(a + b * x, sigma), ys, &["obs"])
//!     .unwrap();
//!
//! let engine = MCMCEngine::new(SamplerConfig::default().with_chains(2));
//! let idata = engine.sample(&model, 1337).unwrap();
//! let summary = summarize(idata.posterior().unwrap(), &SummaryConfig::default());
//! println!("{summary}");
//! ```

/// Implement `Display` through an existing `From<&T> for String`
#[macro_export]
macro_rules! impl_display {
    ($kind: ty) => {
        impl ::std::fmt::Display for $kind {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                write!(f, "{}", String::from(self))
            }
        }
    };
}

pub mod consts;
pub mod data;
pub mod diagnostics;
pub mod dist;
mod error;
pub mod inference;
pub mod misc;
pub mod model;
pub mod optim;
pub mod predictive;
pub mod prelude;
pub mod shape;
pub mod trace;
pub mod traits;
pub mod transform;

pub use error::{Error, Result};
