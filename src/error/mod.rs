use crate::element::PatchError;
use crate::history::HistoryError;
use crate::storage::StorageError;
use thiserror::Error;

pub type BuilderResult<T> = std::result::Result<T, BuilderError>;

#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("no page is open: the element store has not been initialized")]
    StoreNotInitialized,
    #[error("design settings have not been initialized for this project")]
    TokensNotInitialized,
    #[error(transparent)]
    Patch(#[from] PatchError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
