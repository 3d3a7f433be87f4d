//! Deletion pipeline.
//!
//! Draft nodes are spliced out locally with no network call; persisted
//! nodes are deleted remotely first and removed locally only on confirmed
//! success. Structural guards run before any I/O, and deleting non-empty
//! content requires the caller to have confirmed. Sibling order indices
//! are renumbered after every removal.

use courseloom_api::CourseApi;
use tracing::info;

use crate::draft::CourseDraft;
use crate::error::{EditError, StructuralViolation};
use crate::model::{EntityId, Lesson, Section};

/// Whether deleting this section would discard non-empty content and so
/// needs a user confirmation first. The UI collaborator asks, the engine
/// answers; empty placeholder nodes delete without confirmation.
pub fn section_requires_confirmation(section: &Section) -> bool {
    section.has_content()
}

/// Confirmation policy for lessons: non-blank title, attached media, or
/// existing quiz questions all require a confirmation.
pub fn lesson_requires_confirmation(lesson: &Lesson) -> bool {
    lesson.has_content()
}

pub(crate) async fn delete_section(
    api: &dyn CourseApi,
    draft: &mut CourseDraft,
    s: usize,
    confirmed: bool,
) -> Result<(), EditError> {
    let section = draft
        .sections()
        .get(s)
        .ok_or_else(|| StructuralViolation::PathOutOfBounds(format!("section[{s}]")))?;

    if draft.sections().len() == 1 && draft.has_existing_content() {
        return Err(StructuralViolation::LastSection.into());
    }
    if section_requires_confirmation(section) && !confirmed {
        return Err(EditError::ConfirmationRequired);
    }

    match section.id.clone() {
        EntityId::Draft(id) => {
            draft.remove_section_local(s)?;
            info!("[Delete] draft section {} removed locally", id);
        }
        EntityId::Persisted(id) => {
            api.delete_section(draft.course_id(), &id).await?;
            draft.remove_section_local(s)?;
            info!("[Delete] section {} deleted remotely and locally", id);
        }
    }
    Ok(())
}

pub(crate) async fn delete_lesson(
    api: &dyn CourseApi,
    draft: &mut CourseDraft,
    s: usize,
    l: usize,
    confirmed: bool,
) -> Result<(), EditError> {
    let section = draft
        .sections()
        .get(s)
        .ok_or_else(|| StructuralViolation::PathOutOfBounds(format!("section[{s}]")))?;
    let lesson = section.lessons.get(l).ok_or_else(|| {
        StructuralViolation::PathOutOfBounds(format!("section[{s}].lesson[{l}]"))
    })?;

    if section.lessons.len() == 1 {
        return Err(StructuralViolation::LastLesson.into());
    }
    if lesson_requires_confirmation(lesson) && !confirmed {
        return Err(EditError::ConfirmationRequired);
    }

    match lesson.id.clone() {
        EntityId::Draft(id) => {
            draft.remove_lesson_local(s, l)?;
            info!("[Delete] draft lesson {} removed locally", id);
        }
        EntityId::Persisted(id) => {
            // A persisted lesson can only exist under a persisted section.
            let Some(section_id) = section.id.persisted().map(str::to_string) else {
                return Err(StructuralViolation::UnpersistedSection.into());
            };
            api.delete_lesson(&section_id, &id).await?;
            draft.remove_lesson_local(s, l)?;
            info!("[Delete] lesson {} deleted remotely and locally", id);
        }
    }
    Ok(())
}
