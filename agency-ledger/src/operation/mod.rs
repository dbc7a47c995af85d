//! Read model of sold [Operation]s consumed by the debt aggregation.
mod entity;
pub mod error;
mod repo;

use tracing::instrument;

use crate::{primitives::OperationId, store::*};

pub use entity::*;
use error::*;
pub use repo::OperationRepo;

#[derive(Clone)]
pub struct Operations<S: LedgerStore> {
    store: S,
}

impl<S: LedgerStore> Operations<S> {
    pub(crate) fn new(store: &S) -> Self {
        Self {
            store: store.clone(),
        }
    }

    #[instrument(name = "agency_ledger.operations.create", skip(self), err)]
    pub async fn create(&self, new_operation: NewOperation) -> Result<Operation, OperationError> {
        let mut op = self.store.begin_op().await?;
        let operation = new_operation.into_operation(op.now());
        op.insert_operation(&operation).await?;
        op.commit().await?;
        Ok(operation)
    }

    #[instrument(name = "agency_ledger.operations.find", skip(self), err)]
    pub async fn find(&self, id: OperationId) -> Result<Operation, OperationError> {
        let mut op = self.store.begin_op().await?;
        self.find_in_op(&mut op, id).await
    }

    pub(crate) async fn find_in_op(
        &self,
        op: &mut S::Op,
        id: OperationId,
    ) -> Result<Operation, OperationError> {
        op.find_operation(id)
            .await?
            .ok_or(OperationError::NotFound(id))
    }

    #[instrument(name = "agency_ledger.operations.list", skip(self), err)]
    pub async fn list(&self, filter: OperationFilter) -> Result<Vec<Operation>, OperationError> {
        let mut op = self.store.begin_op().await?;
        Ok(op.list_operations(&filter).await?)
    }
}
