//! Error taxonomy of the editing engine.
//!
//! Local errors (validation, structural) are raised before any network
//! call; remote errors surface the underlying `ApiError`. No error here is
//! fatal to the session: every failure leaves the draft editable.

use courseloom_api::ApiError;

use crate::validate::ValidationReport;

/// Error returned by the engine's entry points.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// The draft failed pre-save validation; nothing was submitted.
    #[error("validation failed: {0}")]
    Validation(ValidationReport),

    /// The operation would violate a tree invariant; rejected before I/O.
    #[error("structural violation: {0}")]
    Structural(#[from] StructuralViolation),

    /// Deleting this node discards non-empty content and the caller has
    /// not confirmed.
    #[error("confirmation required before deleting non-empty content")]
    ConfirmationRequired,

    /// A remote call was rejected or never completed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Tree invariants an operation may not break.
#[derive(Debug, thiserror::Error)]
pub enum StructuralViolation {
    #[error("a section must keep at least one lesson")]
    LastLesson,

    #[error("the last section of a course with existing content cannot be deleted")]
    LastSection,

    #[error("lesson cannot be submitted under a section that has not been persisted")]
    UnpersistedSection,

    #[error("a reorder batch may only carry persisted ids")]
    DraftIdInReorder,

    #[error("lesson kind is immutable once the lesson is persisted")]
    KindImmutable,

    #[error("operation only applies to quiz lessons")]
    NotAQuizLesson,

    #[error("no node at {0}")]
    PathOutOfBounds(String),
}
