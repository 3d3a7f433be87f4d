//! Save orchestration: the single entry point behind "Save changes".
//!
//! One save invocation runs validation, then reconciliation, then the
//! batch reorder submissions, strictly in that order. Reorder batches are
//! built from the tree *after* reconciliation has rewritten draft ids, so
//! a section created and reordered in the same save submits its
//! server-issued id. Remote calls are awaited one at a time; no two
//! entity-mutating calls for the same save are ever in flight together.
//!
//! `save` takes `&mut self`, so a second save while one is in flight is
//! unrepresentable in safe code; callers sharing a session behind a lock
//! serialize saves instead of interleaving them.

use std::sync::Arc;

use courseloom_api::CourseApi;
use tracing::info;

use crate::delete;
use crate::draft::CourseDraft;
use crate::error::{EditError, StructuralViolation};
use crate::model::EntityId;
use crate::reconcile::{self, FailedStep, SaveStep, StepLog};
use crate::validate::validate_course;

/// Outcome of one save invocation: the steps that were applied, and the
/// step it stopped at if it did not complete. This is the one
/// success/failure notification the UI shows per save.
#[derive(Debug, Default)]
pub struct SaveReport {
    pub applied: Vec<SaveStep>,
    pub failure: Option<FailedStep>,
}

impl SaveReport {
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

/// An editing session: the draft plus the API handle it reconciles
/// against. The single mutation surface for the UI collaborator.
pub struct EditSession {
    api: Arc<dyn CourseApi>,
    draft: CourseDraft,
}

impl EditSession {
    pub fn new(api: Arc<dyn CourseApi>, draft: CourseDraft) -> Self {
        Self { api, draft }
    }

    pub fn draft(&self) -> &CourseDraft {
        &self.draft
    }

    /// Mutation entry points live on the draft store.
    pub fn draft_mut(&mut self) -> &mut CourseDraft {
        &mut self.draft
    }

    /// Discard all edits and revert to the last clean baseline.
    pub fn discard(&mut self) {
        self.draft.discard();
    }

    /// Delete a section. Draft sections are removed locally; persisted
    /// ones are deleted remotely first. `confirmed` acknowledges the
    /// deletion of non-empty content.
    pub async fn delete_section(&mut self, s: usize, confirmed: bool) -> Result<(), EditError> {
        delete::delete_section(self.api.as_ref(), &mut self.draft, s, confirmed).await
    }

    /// Delete a lesson, same contract as `delete_section`.
    pub async fn delete_lesson(
        &mut self,
        s: usize,
        l: usize,
        confirmed: bool,
    ) -> Result<(), EditError> {
        delete::delete_lesson(self.api.as_ref(), &mut self.draft, s, l, confirmed).await
    }

    /// Persist the draft: reconciliation, then reorder submissions.
    ///
    /// # Errors
    ///
    /// Local errors (`Validation`, `Structural`) mean nothing was
    /// submitted. Remote failures are not errors of this method: they
    /// come back inside the `SaveReport`, with dirty marks preserved for
    /// everything not yet successfully submitted so a retried save
    /// resumes from the failure point.
    pub async fn save(&mut self) -> Result<SaveReport, EditError> {
        if !self.draft.has_unsaved_changes() {
            info!("[EditSession] save with no unsaved changes");
            return Ok(SaveReport::default());
        }

        let validation = validate_course(self.draft.sections());
        if !validation.is_valid() {
            return Err(EditError::Validation(validation));
        }

        let mut log = StepLog::default();
        reconcile::reconcile(self.api.as_ref(), &mut self.draft, &mut log).await;

        if log.succeeded() && self.draft.dirty().sections_reordered() {
            self.submit_section_order(&mut log).await?;
        }
        if log.succeeded() {
            self.submit_lesson_orders(&mut log).await?;
        }

        let (applied, failure) = log.into_parts();
        if failure.is_none() {
            self.draft.commit_baseline();
            info!(
                "[EditSession] save succeeded with {} applied operations",
                applied.len()
            );
        } else {
            info!(
                "[EditSession] save failed after {} applied operations",
                applied.len()
            );
        }
        Ok(SaveReport { applied, failure })
    }

    /// Submit the full section order as one batch. Runs only after
    /// reconciliation succeeded, so every id in the batch is stable.
    async fn submit_section_order(&mut self, log: &mut StepLog) -> Result<(), EditError> {
        let ids = persisted_ids(self.draft.sections().iter().map(|s| &s.id))?;
        let result = self.api.reorder_sections(self.draft.course_id(), &ids).await;
        if log.fold(SaveStep::ReorderSections, result).is_some() {
            self.draft.dirty_mut().clear_sections_reordered();
        }
        Ok(())
    }

    /// Submit one lesson-order batch per section flagged as reordered,
    /// in tree order, stopping at the first failure.
    async fn submit_lesson_orders(&mut self, log: &mut StepLog) -> Result<(), EditError> {
        let flagged: Vec<EntityId> = self
            .draft
            .sections()
            .iter()
            .filter(|s| self.draft.dirty().lessons_reordered(&s.id))
            .map(|s| s.id.clone())
            .collect();

        for section_id in flagged {
            let Some(section) = self
                .draft
                .sections()
                .iter()
                .find(|s| s.id == section_id)
            else {
                continue;
            };
            let stable_id = section_id
                .persisted()
                .ok_or(StructuralViolation::DraftIdInReorder)?
                .to_string();
            let ids = persisted_ids(section.lessons.iter().map(|l| &l.id))?;

            let result = self.api.reorder_lessons(&stable_id, &ids).await;
            if log
                .fold(SaveStep::ReorderLessons { section_id: stable_id }, result)
                .is_none()
            {
                return Ok(());
            }
            self.draft.dirty_mut().clear_lessons_reordered(&section_id);
        }
        Ok(())
    }
}

/// Collect stable ids in order; a draft id in a reorder batch is a
/// structural violation (creates must have resolved it first).
fn persisted_ids<'a>(
    ids: impl Iterator<Item = &'a EntityId>,
) -> Result<Vec<String>, StructuralViolation> {
    ids.map(|id| {
        id.persisted()
            .map(str::to_string)
            .ok_or(StructuralViolation::DraftIdInReorder)
    })
    .collect()
}
