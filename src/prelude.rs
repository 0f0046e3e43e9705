//! Re-imports for convenience
#[doc(no_inline)]
pub use crate::data::{
    Ar1Process, Dataset, Generator, LinearProcess, Noise, SeasonalProcess, Synthetic,
};
#[doc(no_inline)]
pub use crate::diagnostics::{summarize, ConvergenceReport, SummaryConfig};
#[doc(no_inline)]
pub use crate::dist::Family;
#[doc(no_inline)]
pub use crate::inference::{
    find_map, AdviConfig, AdviMethod, InferenceEngine, MCMCEngine, MapConfig, SamplerConfig,
    StepMethod, VariationalEngine,
};
#[doc(no_inline)]
pub use crate::model::{DistSpec, Expr, ExprExt, Model, VarRef};
#[doc(no_inline)]
pub use crate::predictive::{predictive_resample, sample_prior_predictive};
#[doc(no_inline)]
pub use crate::trace::InferenceData;
