use crate::model::FolderId;

use super::source::SourceKind;

/// Errors of the folder store and its services.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("folder {0} not found")]
    NotFound(FolderId),

    #[error("parent folder {0} not found")]
    ParentNotFound(FolderId),

    #[error("cannot move folder {folder} into itself or its descendant {parent}")]
    CircularReference { folder: FolderId, parent: FolderId },

    #[error("a folder named {name:?} already exists in this location")]
    AlreadyExists { name: String },

    #[error("folder name must not be blank")]
    BlankName,

    #[error("malformed tree path {path:?} from {origin:?}")]
    MalformedPath { path: String, origin: SourceKind },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
