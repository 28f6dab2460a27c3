use std::borrow::Cow;

use thiserror::Error;

use crate::id::Guid;

/// Error returned by pin, unpin, and pinboard search operations.
///
/// The first five variants are the business-rule rejections. Each one maps to a
/// stable message key via [`SetsError::message_key`] so the calling layer can
/// translate it.
#[derive(Debug, Error)]
pub enum SetsError {
    /// The content entity could not be resolved.
    #[error("invalid entity")]
    InvalidEntity { guid: Option<Guid> },

    /// The set is missing or is not an `au_set` object.
    #[error("invalid set")]
    InvalidSet { guid: Option<Guid> },

    /// A set cannot be pinned to itself.
    #[error("a set cannot be pinned to itself")]
    RecursivePin { guid: Guid },

    /// No acting user was supplied and nobody is logged in.
    #[error("no user to act as")]
    InvalidUser,

    /// The acting user lacks edit permission on the set.
    #[error("user {user} cannot edit set {set}")]
    CannotEdit { user: Guid, set: Guid },

    /// The host store or access service failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SetsError {
    /// Translation key for the rejection, or `None` for host failures.
    pub fn message_key(&self) -> Option<&'static str> {
        match self {
            SetsError::InvalidEntity { .. } => Some("au_sets:error:invalid:entity"),
            SetsError::InvalidSet { .. } => Some("au_sets:error:invalid:set"),
            SetsError::RecursivePin { .. } => Some("au_sets:error:recursive:pin"),
            SetsError::InvalidUser => Some("au_sets:error:invalid:user"),
            SetsError::CannotEdit { .. } => Some("au_sets:error:cannot:edit"),
            SetsError::Store(_) => None,
        }
    }
}

/// Failure reported by a host store or access-control backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying Redis command failed.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A stored document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Fixture or other local file access failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{message}")]
    Other { message: Cow<'static, str> },
}
