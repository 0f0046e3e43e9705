use crate::data::DataError;
use crate::dist::ParamError;
use crate::inference::SamplingError;
use crate::model::ModelError;
use crate::optim::OptimizeError;
use crate::shape::ShapeError;
use crate::trace::TraceError;

/// Any error raised by this crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Sampling(#[from] SamplingError),
    #[error(transparent)]
    Trace(#[from] TraceError),
    #[error(transparent)]
    Optimize(#[from] OptimizeError),
}

pub type Result<T> = std::result::Result<T, Error>;
