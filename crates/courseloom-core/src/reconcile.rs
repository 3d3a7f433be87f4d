//! Reconciliation: turn "what changed" into the minimal ordered set of
//! remote calls, in dependency order.
//!
//! Sections are visited in order-index order; a section's own create or
//! update must succeed before its lessons are considered, because the
//! remote system rejects lesson operations referencing a section id it
//! never issued. Draft ids are resolved to server-issued ones in place:
//! the node is located by its id, not its index, and only the id changes.
//!
//! The stop-on-first-failure policy lives in `StepLog`, a named
//! accumulator, rather than inline control flow: every remote call is
//! folded into the log, and the walk stops as soon as the log records a
//! failure. Per-node dirty marks are cleared the moment that node's call
//! succeeds, so a retried save resumes from the failure point instead of
//! resubmitting completed work.

use courseloom_api::{
    ApiError, ApiResult, CourseApi, LessonBody, LessonPayload, LessonUpdate, QuestionPayload,
    SectionPayload,
};
use tracing::{debug, info, warn};

use crate::draft::{CourseDraft, LessonMarks};
use crate::model::{EntityId, Lesson, LessonContent, Section};

/// One remote operation applied (or attempted) during a save invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStep {
    /// `id` is the server-issued id on success, the draft id on failure.
    CreateSection { id: String },
    UpdateSection { id: String },
    CreateLesson { section_id: String, id: String },
    UpdateLesson { section_id: String, id: String },
    ReorderSections,
    ReorderLessons { section_id: String },
}

/// The step a save invocation stopped at, with its error.
#[derive(Debug)]
pub struct FailedStep {
    pub step: SaveStep,
    pub error: ApiError,
}

/// Step-result accumulator for one save invocation.
///
/// Records every successfully applied step in order and at most one
/// failure. Once a failure is recorded the invocation must not issue
/// further entity-mutating calls.
#[derive(Debug, Default)]
pub struct StepLog {
    applied: Vec<SaveStep>,
    failed: Option<FailedStep>,
}

impl StepLog {
    pub fn applied(&self) -> &[SaveStep] {
        &self.applied
    }

    pub fn failure(&self) -> Option<&FailedStep> {
        self.failed.as_ref()
    }

    pub fn succeeded(&self) -> bool {
        self.failed.is_none()
    }

    pub(crate) fn into_parts(self) -> (Vec<SaveStep>, Option<FailedStep>) {
        (self.applied, self.failed)
    }

    /// Fold one remote call's result into the log. Returns the value on
    /// success; on failure records the step and yields `None`, which
    /// callers treat as the signal to stop.
    pub(crate) fn fold<T>(&mut self, step: SaveStep, result: ApiResult<T>) -> Option<T> {
        debug_assert!(self.failed.is_none(), "call issued after a recorded failure");
        match result {
            Ok(value) => {
                self.applied.push(step);
                Some(value)
            }
            Err(error) => {
                self.fail(step, error);
                None
            }
        }
    }

    pub(crate) fn push(&mut self, step: SaveStep) {
        self.applied.push(step);
    }

    pub(crate) fn fail(&mut self, step: SaveStep, error: ApiError) {
        warn!("[StepLog] save stopped at {:?}: {}", step, error);
        self.failed = Some(FailedStep { step, error });
    }
}

/// Walk the draft tree and issue creates/updates for every dirty node.
///
/// Stops at the first failure; earlier calls are not rolled back. Lessons
/// under a section that is still a draft when their turn comes are skipped
/// (structural precondition), keeping their dirty marks.
pub(crate) async fn reconcile(api: &dyn CourseApi, draft: &mut CourseDraft, log: &mut StepLog) {
    let section_ids: Vec<EntityId> = draft.sections().iter().map(|s| s.id.clone()).collect();

    for section_id in section_ids {
        let section_id = match reconcile_section(api, draft, log, section_id).await {
            Some(id) => id,
            None => return,
        };

        // Descend only once the section has a stable id.
        let Some(stable_id) = section_id.persisted().map(str::to_string) else {
            debug!(
                "[Reconcile] section {} has no stable id, skipping its lessons",
                section_id.raw()
            );
            continue;
        };

        let lesson_ids: Vec<EntityId> = match find_section(draft, &section_id) {
            Some(section) => section.lessons.iter().map(|l| l.id.clone()).collect(),
            None => continue,
        };
        for lesson_id in lesson_ids {
            if reconcile_lesson(api, draft, log, &section_id, &stable_id, lesson_id)
                .await
                .is_none()
            {
                return;
            }
        }
    }
}

/// Create or update one section as its dirty marks demand. Returns the
/// section's id afterwards (rewritten if a create succeeded), or `None`
/// if the save must stop.
async fn reconcile_section(
    api: &dyn CourseApi,
    draft: &mut CourseDraft,
    log: &mut StepLog,
    section_id: EntityId,
) -> Option<EntityId> {
    let marks = draft.dirty().section_marks(&section_id);
    if !marks.any() {
        return Some(section_id);
    }
    let payload = match find_section(draft, &section_id) {
        Some(section) => section_payload(section),
        None => return Some(section_id),
    };

    match &section_id {
        EntityId::Draft(draft_id) => {
            let created = match api.create_section(draft.course_id(), &payload).await {
                Ok(created) => created,
                Err(error) => {
                    log.fail(
                        SaveStep::CreateSection {
                            id: draft_id.clone(),
                        },
                        error,
                    );
                    return None;
                }
            };
            // Adopt the server id in place; position and order_index of
            // the local node stay exactly as they are.
            let new_id = EntityId::Persisted(created.id.clone());
            if let Some(section) = find_section_mut(draft, &section_id) {
                section.id = new_id.clone();
            }
            draft.dirty_mut().rekey_section(&section_id, &new_id);
            draft.dirty_mut().clear_section_marks(&new_id);
            log.push(SaveStep::CreateSection { id: created.id });
            info!(
                "[Reconcile] section {} created as {}",
                section_id.raw(),
                new_id.raw()
            );
            Some(new_id)
        }
        EntityId::Persisted(stable_id) => {
            log.fold(
                SaveStep::UpdateSection {
                    id: stable_id.clone(),
                },
                api.update_section(draft.course_id(), stable_id, &payload)
                    .await,
            )?;
            draft.dirty_mut().clear_section_marks(&section_id);
            Some(section_id)
        }
    }
}

/// Create or update one lesson as its dirty marks demand. Returns `None`
/// if the save must stop.
async fn reconcile_lesson(
    api: &dyn CourseApi,
    draft: &mut CourseDraft,
    log: &mut StepLog,
    section_id: &EntityId,
    section_stable_id: &str,
    lesson_id: EntityId,
) -> Option<()> {
    let marks = draft.dirty().lesson_marks(&lesson_id);
    if !marks.any() {
        return Some(());
    }
    let Some(lesson) = find_lesson(draft, section_id, &lesson_id).cloned() else {
        return Some(());
    };

    match &lesson_id {
        EntityId::Draft(draft_id) => {
            let payload = lesson_payload(&lesson);
            let created = match api.create_lesson(section_stable_id, &payload).await {
                Ok(created) => created,
                Err(error) => {
                    log.fail(
                        SaveStep::CreateLesson {
                            section_id: section_stable_id.to_string(),
                            id: draft_id.clone(),
                        },
                        error,
                    );
                    return None;
                }
            };
            let new_id = EntityId::Persisted(created.id.clone());
            if let Some(node) = find_lesson_mut(draft, section_id, &lesson_id) {
                node.id = new_id.clone();
            }
            draft.dirty_mut().clear_lesson_marks(&lesson_id);
            log.push(SaveStep::CreateLesson {
                section_id: section_stable_id.to_string(),
                id: created.id,
            });
            info!(
                "[Reconcile] lesson {} created as {}",
                lesson_id.raw(),
                new_id.raw()
            );
            Some(())
        }
        EntityId::Persisted(stable_id) => {
            let update = lesson_update(&lesson, marks);
            log.fold(
                SaveStep::UpdateLesson {
                    section_id: section_stable_id.to_string(),
                    id: stable_id.clone(),
                },
                api.update_lesson(section_stable_id, stable_id, &update)
                    .await,
            )?;
            draft.dirty_mut().clear_lesson_marks(&lesson_id);
            Some(())
        }
    }
}

fn find_section<'a>(draft: &'a CourseDraft, id: &EntityId) -> Option<&'a Section> {
    draft.sections().iter().find(|s| &s.id == id)
}

fn find_section_mut<'a>(draft: &'a mut CourseDraft, id: &EntityId) -> Option<&'a mut Section> {
    draft.sections_mut().iter_mut().find(|s| &s.id == id)
}

fn find_lesson<'a>(
    draft: &'a CourseDraft,
    section_id: &EntityId,
    lesson_id: &EntityId,
) -> Option<&'a Lesson> {
    find_section(draft, section_id)?
        .lessons
        .iter()
        .find(|l| &l.id == lesson_id)
}

fn find_lesson_mut<'a>(
    draft: &'a mut CourseDraft,
    section_id: &EntityId,
    lesson_id: &EntityId,
) -> Option<&'a mut Lesson> {
    find_section_mut(draft, section_id)?
        .lessons
        .iter_mut()
        .find(|l| &l.id == lesson_id)
}

// ---- wire mapping -----------------------------------------------------

fn section_payload(section: &Section) -> SectionPayload {
    SectionPayload {
        title: section.title.clone(),
        description: section.description.clone(),
    }
}

fn lesson_payload(lesson: &Lesson) -> LessonPayload {
    LessonPayload {
        title: lesson.title.clone(),
        body: lesson_body(&lesson.content),
    }
}

/// Build the kind-specific wire body, stripping client-only state:
/// question draft ids and order indices never cross the network, the
/// transmitted list order is the order.
fn lesson_body(content: &LessonContent) -> LessonBody {
    match content {
        LessonContent::Video(video) => LessonBody::Video {
            upload_id: video.upload_id.clone(),
            url: video.url.clone(),
            duration_seconds: video.duration_seconds,
        },
        LessonContent::Quiz(quiz) => LessonBody::Quiz {
            questions: quiz
                .questions
                .iter()
                .map(|q| QuestionPayload {
                    question_text: q.question_text.clone(),
                    option_a: q.options[0].clone(),
                    option_b: q.options[1].clone(),
                    option_c: q.options[2].clone(),
                    option_d: q.options[3].clone(),
                    correct_answer: q.correct_answer.as_str().to_string(),
                    explanation: q.explanation.clone(),
                })
                .collect(),
            source_documents: quiz.source_documents.clone(),
            spreadsheet_import: quiz.spreadsheet_import.clone(),
        },
    }
}

/// Build a partial update carrying only the fields marked dirty.
fn lesson_update(lesson: &Lesson, marks: LessonMarks) -> LessonUpdate {
    LessonUpdate {
        title: marks.title.then(|| lesson.title.clone()),
        body: marks.content.then(|| lesson_body(&lesson.content)),
    }
}
