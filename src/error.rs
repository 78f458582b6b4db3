//! Index error types.

use thiserror::Error;

/// Errors produced by index mutations.
///
/// Search never fails; only `add`/`remove` and their batch variants return
/// errors. Batched operations stop at the first failing document and
/// report its error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// The document has no usable `id` field.
    #[error("document is missing an id field")]
    DocumentMissingId,

    /// `add` was invoked with an id that is already indexed.
    #[error("document already exists in the index")]
    DocumentExists,

    /// `remove` was invoked with an id that is not indexed.
    #[error("document does not exist in the index")]
    DocumentNotExists,

    /// The document presented to `remove` differs from the one indexed.
    #[error("document does not match the indexed version")]
    DocumentMutated,

    /// An indexed field holds a value with no text rendering.
    #[error("field `{field}` is not a string and cannot be rendered as text")]
    FieldNotString {
        /// Name of the offending field.
        field: String,
    },
}
