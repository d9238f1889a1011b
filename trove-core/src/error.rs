use crate::RowId;
use thiserror::Error;

/// Failures this layer raises itself.
///
/// They travel inside `anyhow::Error` like every other failure, callers
/// classify them with `StoreError::kind_of` or `Error::downcast_ref`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("The model `{model}` could not be found")]
    ModelNotFound { model: String },
    #[error("The entity `{entity}` is not declared in the model")]
    EntityNotFound { entity: String },
    #[error("The `{entity}` entity has an empty identifier")]
    InvalidIdentifier { entity: String },
    #[error("No `{entity}` entity with identifier `{id}`")]
    NotFound { entity: String, id: String },
    #[error("The `{entity}` row {row_id} was deleted")]
    RowDeleted { entity: String, row_id: RowId },
    #[error("The storage worker is not running")]
    WorkerClosed,
    #[error("The storage worker panicked: {message}")]
    WorkerPanicked { message: String },
}

impl StoreError {
    /// Finds the `StoreError` carried by an error, including wrapped in context.
    pub fn kind_of(error: &crate::Error) -> Option<&StoreError> {
        error.downcast_ref::<StoreError>()
    }

    pub fn is(error: &crate::Error, predicate: impl Fn(&StoreError) -> bool) -> bool {
        Self::kind_of(error).is_some_and(predicate)
    }
}
