use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    primitives::{OperatorPaymentId, PaymentId},
    store::StoreError,
};

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("PaymentError - Store: {0}")]
    Store(#[from] StoreError),
    #[error("PaymentError - NotFound: id '{0}' not found")]
    NotFound(PaymentId),
    #[error("PaymentError - NotPaid: payment '{0}' has not been paid")]
    NotPaid(PaymentId),
    #[error("PaymentError - OperatorPaymentNotFound: id '{0}' not found")]
    OperatorPaymentNotFound(OperatorPaymentId),
    #[error("PaymentError - OperatorPaymentAlreadyPaid: '{0}' is already settled")]
    OperatorPaymentAlreadyPaid(OperatorPaymentId),
    #[error("PaymentError - OperatorPaymentMismatch: '{0}' belongs to a different operation or operator")]
    OperatorPaymentMismatch(OperatorPaymentId),
    #[error("PaymentError - Overflow: {amount} at rate {rate} does not fit in a decimal")]
    Overflow { amount: Decimal, rate: Decimal },
}
