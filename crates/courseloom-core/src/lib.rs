//! Course content editing & synchronization engine.
//!
//! An instructor edits a tree of sections → lessons → quiz questions
//! entirely in memory, optimistically; this crate reconciles that draft
//! against a remote persistence API that issues stable identifiers and
//! enforces parent-before-child creation order.
//!
//! - `model` - entity model with `Draft`/`Persisted` tagged ids
//! - `draft` - `CourseDraft`: the tree, dirty marks, reorder flags
//! - `reorder` - splice-and-restamp sibling reordering
//! - `validate` - pure pre-save validation
//! - `reconcile` - dirty state → ordered remote create/update calls
//! - `delete` - local-or-remote-first node deletion
//! - `save` - `EditSession`: the save orchestrator
//! - `error` - local/structural/remote error taxonomy

pub mod delete;
pub mod draft;
pub mod error;
pub mod model;
pub mod reconcile;
pub mod reorder;
pub mod save;
pub mod validate;

pub use delete::{lesson_requires_confirmation, section_requires_confirmation};
pub use draft::{CourseDraft, DirtyState, LessonMarks, SectionMarks};
pub use error::{EditError, StructuralViolation};
pub use model::{
    AnswerChoice, EntityId, Lesson, LessonContent, LessonKind, Quiz, QuizQuestion, Section,
    VideoRef,
};
pub use reconcile::{FailedStep, SaveStep, StepLog};
pub use save::{EditSession, SaveReport};
pub use validate::{validate_course, NodePath, ValidationReport, Violation};
