use thiserror::Error;

use crate::model::{DurationParseError, IdError, RouteError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Id(#[from] IdError),
    #[error(transparent)]
    Duration(#[from] DurationParseError),
    #[error(transparent)]
    Route(#[from] RouteError),
}
