use thiserror::Error;

use crate::{primitives::OperationId, store::StoreError};

#[derive(Error, Debug)]
pub enum OperationError {
    #[error("OperationError - Store: {0}")]
    Store(#[from] StoreError),
    #[error("OperationError - NotFound: id '{0}' not found")]
    NotFound(OperationId),
}
