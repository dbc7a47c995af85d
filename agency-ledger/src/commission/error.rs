use thiserror::Error;

use crate::{primitives::CommissionId, store::StoreError};

#[derive(Error, Debug)]
pub enum CommissionError {
    #[error("CommissionError - Store: {0}")]
    Store(#[from] StoreError),
    #[error("CommissionError - NotFound: id '{0}' not found")]
    NotFound(CommissionId),
    #[error("La comisión ya está pagada")]
    AlreadyPaid(CommissionId),
}
