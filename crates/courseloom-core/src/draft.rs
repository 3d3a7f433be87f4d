//! The draft store: the single source of truth the UI renders from.
//!
//! `CourseDraft` owns the section → lesson → question tree plus two kinds
//! of side state the wire never sees:
//!
//! - per-field dirty marks ("changed since the last successful save"), which
//!   drive create/update decisions during reconciliation;
//! - reorder flags per tree level, which drive the separate batch reorder
//!   submissions.
//!
//! The two classes are tracked independently because they map to different
//! remote operations. Every mutation replaces the touched subtree as one
//! atomic assignment; renderers never observe a half-applied edit.
//!
//! Marks are keyed by the entity's raw id rather than its position, so they
//! survive sibling reorders and deletions without remapping.

use std::collections::{HashMap, HashSet};

use crate::error::StructuralViolation;
use crate::model::{AnswerChoice, EntityId, Lesson, LessonContent, LessonKind, QuizQuestion, Section};
use crate::reorder;

/// Per-field dirty marks of a section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionMarks {
    pub title: bool,
    pub description: bool,
}

impl SectionMarks {
    pub fn any(&self) -> bool {
        self.title || self.description
    }

    fn all() -> Self {
        Self {
            title: true,
            description: true,
        }
    }
}

/// Per-field dirty marks of a lesson. Question edits and question reorders
/// mark `content`, because questions travel inside the lesson payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LessonMarks {
    pub title: bool,
    pub content: bool,
}

impl LessonMarks {
    pub fn any(&self) -> bool {
        self.title || self.content
    }

    fn all() -> Self {
        Self {
            title: true,
            content: true,
        }
    }
}

/// Dirty state of the whole draft, separate from the tree itself.
#[derive(Debug, Clone, Default)]
pub struct DirtyState {
    section_marks: HashMap<String, SectionMarks>,
    lesson_marks: HashMap<String, LessonMarks>,
    sections_reordered: bool,
    /// Raw ids of sections whose lesson order changed.
    lessons_reordered: HashSet<String>,
}

impl DirtyState {
    pub fn is_clean(&self) -> bool {
        self.section_marks.values().all(|m| !m.any())
            && self.lesson_marks.values().all(|m| !m.any())
            && !self.sections_reordered
            && self.lessons_reordered.is_empty()
    }

    pub fn section_marks(&self, id: &EntityId) -> SectionMarks {
        self.section_marks
            .get(id.raw())
            .copied()
            .unwrap_or_default()
    }

    pub fn lesson_marks(&self, id: &EntityId) -> LessonMarks {
        self.lesson_marks.get(id.raw()).copied().unwrap_or_default()
    }

    pub fn sections_reordered(&self) -> bool {
        self.sections_reordered
    }

    pub fn lessons_reordered(&self, section_id: &EntityId) -> bool {
        self.lessons_reordered.contains(section_id.raw())
    }

    fn mark_section(&mut self, id: &EntityId, update: impl FnOnce(&mut SectionMarks)) {
        update(self.section_marks.entry(id.raw().to_string()).or_default());
    }

    fn mark_lesson(&mut self, id: &EntityId, update: impl FnOnce(&mut LessonMarks)) {
        update(self.lesson_marks.entry(id.raw().to_string()).or_default());
    }

    pub(crate) fn clear_section_marks(&mut self, id: &EntityId) {
        self.section_marks.remove(id.raw());
    }

    pub(crate) fn clear_lesson_marks(&mut self, id: &EntityId) {
        self.lesson_marks.remove(id.raw());
    }

    pub(crate) fn set_sections_reordered(&mut self) {
        self.sections_reordered = true;
    }

    pub(crate) fn clear_sections_reordered(&mut self) {
        self.sections_reordered = false;
    }

    pub(crate) fn mark_lessons_reordered(&mut self, section_id: &EntityId) {
        self.lessons_reordered.insert(section_id.raw().to_string());
    }

    pub(crate) fn clear_lessons_reordered(&mut self, section_id: &EntityId) {
        self.lessons_reordered.remove(section_id.raw());
    }

    /// Drop every mark belonging to a removed node.
    pub(crate) fn forget_section(&mut self, section: &Section) {
        self.section_marks.remove(section.id.raw());
        self.lessons_reordered.remove(section.id.raw());
        for lesson in &section.lessons {
            self.lesson_marks.remove(lesson.id.raw());
        }
    }

    pub(crate) fn forget_lesson(&mut self, lesson: &Lesson) {
        self.lesson_marks.remove(lesson.id.raw());
    }

    /// Re-key section-level state after a placeholder id was replaced by a
    /// server-issued one. Field marks are cleared by the caller at that
    /// point; the lessons-reordered flag must survive the rewrite.
    pub(crate) fn rekey_section(&mut self, old: &EntityId, new: &EntityId) {
        if self.lessons_reordered.remove(old.raw()) {
            self.lessons_reordered.insert(new.raw().to_string());
        }
        if let Some(marks) = self.section_marks.remove(old.raw()) {
            self.section_marks.insert(new.raw().to_string(), marks);
        }
    }

    fn clear_all(&mut self) {
        self.section_marks.clear();
        self.lesson_marks.clear();
        self.sections_reordered = false;
        self.lessons_reordered.clear();
    }
}

/// The draft tree plus its clean baseline and dirty state.
#[derive(Debug, Clone)]
pub struct CourseDraft {
    course_id: String,
    sections: Vec<Section>,
    baseline: Vec<Section>,
    dirty: DirtyState,
    has_existing_content: bool,
}

impl CourseDraft {
    /// Start an empty draft for a course with no content yet.
    pub fn new(course_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            sections: Vec::new(),
            baseline: Vec::new(),
            dirty: DirtyState::default(),
            has_existing_content: false,
        }
    }

    /// Build a clean draft from a persisted course fetched from the remote
    /// system. The given tree becomes both the working copy and the
    /// baseline.
    pub fn from_persisted(course_id: impl Into<String>, sections: Vec<Section>) -> Self {
        let has_existing_content = !sections.is_empty();
        Self {
            course_id: course_id.into(),
            baseline: sections.clone(),
            sections,
            dirty: DirtyState::default(),
            has_existing_content,
        }
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn dirty(&self) -> &DirtyState {
        &self.dirty
    }

    /// Whether the course had persisted content when editing began.
    /// Guards deletion of the last remaining section.
    pub fn has_existing_content(&self) -> bool {
        self.has_existing_content
    }

    /// Anything to save: any dirty field or any reorder flag.
    pub fn has_unsaved_changes(&self) -> bool {
        !self.dirty.is_clean()
    }

    /// Discard the draft and revert to the last clean baseline.
    pub fn discard(&mut self) {
        self.sections = self.baseline.clone();
        self.dirty.clear_all();
    }

    /// Adopt the current tree as the new clean baseline. Called by the
    /// save orchestrator after a fully successful save.
    pub(crate) fn commit_baseline(&mut self) {
        self.baseline = self.sections.clone();
        self.has_existing_content = !self.sections.is_empty();
        self.dirty.clear_all();
    }

    pub(crate) fn sections_mut(&mut self) -> &mut Vec<Section> {
        &mut self.sections
    }

    pub(crate) fn dirty_mut(&mut self) -> &mut DirtyState {
        &mut self.dirty
    }

    // ---- lookups ------------------------------------------------------

    fn section_at(&self, s: usize) -> Result<&Section, StructuralViolation> {
        self.sections
            .get(s)
            .ok_or_else(|| StructuralViolation::PathOutOfBounds(format!("section[{s}]")))
    }

    fn section_at_mut(&mut self, s: usize) -> Result<&mut Section, StructuralViolation> {
        self.sections
            .get_mut(s)
            .ok_or_else(|| StructuralViolation::PathOutOfBounds(format!("section[{s}]")))
    }

    fn lesson_at_mut(&mut self, s: usize, l: usize) -> Result<&mut Lesson, StructuralViolation> {
        self.section_at_mut(s)?
            .lessons
            .get_mut(l)
            .ok_or_else(|| StructuralViolation::PathOutOfBounds(format!("section[{s}].lesson[{l}]")))
    }

    fn quiz_question_at_mut(
        &mut self,
        s: usize,
        l: usize,
        q: usize,
    ) -> Result<&mut QuizQuestion, StructuralViolation> {
        let lesson = self.lesson_at_mut(s, l)?;
        let LessonContent::Quiz(quiz) = &mut lesson.content else {
            return Err(StructuralViolation::NotAQuizLesson);
        };
        quiz.questions.get_mut(q).ok_or_else(|| {
            StructuralViolation::PathOutOfBounds(format!("section[{s}].lesson[{l}].question[{q}]"))
        })
    }

    // ---- insertion ----------------------------------------------------

    /// Insert a fresh draft section at `at` (clamped to the end). The new
    /// node starts fully dirty so the next save creates it.
    pub fn insert_section(&mut self, at: usize) -> usize {
        let at = at.min(self.sections.len());
        let section = Section::draft(at as u32);
        self.dirty.mark_section(&section.id, |m| *m = SectionMarks::all());
        self.dirty
            .mark_lesson(&section.lessons[0].id, |m| *m = LessonMarks::all());
        self.sections.insert(at, section);
        reorder::restamp(&mut self.sections);
        at
    }

    /// Insert a fresh draft lesson of `kind` into a section.
    pub fn insert_lesson(
        &mut self,
        s: usize,
        at: usize,
        kind: LessonKind,
    ) -> Result<usize, StructuralViolation> {
        let section = self.section_at_mut(s)?;
        let at = at.min(section.lessons.len());
        let lesson = Lesson::draft(kind, at as u32);
        let id = lesson.id.clone();
        section.lessons.insert(at, lesson);
        reorder::restamp(&mut section.lessons);
        self.dirty.mark_lesson(&id, |m| *m = LessonMarks::all());
        Ok(at)
    }

    /// Insert a blank question into a quiz lesson.
    pub fn insert_question(
        &mut self,
        s: usize,
        l: usize,
        at: usize,
    ) -> Result<usize, StructuralViolation> {
        let lesson_id = self.lesson_at_mut(s, l)?.id.clone();
        let lesson = self.lesson_at_mut(s, l)?;
        let LessonContent::Quiz(quiz) = &mut lesson.content else {
            return Err(StructuralViolation::NotAQuizLesson);
        };
        let at = at.min(quiz.questions.len());
        quiz.questions.insert(at, QuizQuestion::blank(at as u32));
        reorder::restamp(&mut quiz.questions);
        self.dirty.mark_lesson(&lesson_id, |m| m.content = true);
        Ok(at)
    }

    /// Remove a question from a quiz lesson. Local-only; question order
    /// and content travel inside the lesson payload.
    pub fn remove_question(&mut self, s: usize, l: usize, q: usize) -> Result<(), StructuralViolation> {
        self.quiz_question_at_mut(s, l, q)?;
        let lesson = self.lesson_at_mut(s, l)?;
        let LessonContent::Quiz(quiz) = &mut lesson.content else {
            return Err(StructuralViolation::NotAQuizLesson);
        };
        quiz.questions.remove(q);
        reorder::restamp(&mut quiz.questions);
        let id = lesson.id.clone();
        self.dirty.mark_lesson(&id, |m| m.content = true);
        Ok(())
    }

    // ---- field mutation -----------------------------------------------

    pub fn set_section_title(&mut self, s: usize, title: impl Into<String>) -> Result<(), StructuralViolation> {
        let section = self.section_at_mut(s)?;
        let title = title.into();
        if section.title == title {
            return Ok(());
        }
        section.title = title;
        let id = section.id.clone();
        self.dirty.mark_section(&id, |m| m.title = true);
        Ok(())
    }

    pub fn set_section_description(
        &mut self,
        s: usize,
        description: impl Into<String>,
    ) -> Result<(), StructuralViolation> {
        let section = self.section_at_mut(s)?;
        let description = description.into();
        if section.description == description {
            return Ok(());
        }
        section.description = description;
        let id = section.id.clone();
        self.dirty.mark_section(&id, |m| m.description = true);
        Ok(())
    }

    pub fn set_lesson_title(
        &mut self,
        s: usize,
        l: usize,
        title: impl Into<String>,
    ) -> Result<(), StructuralViolation> {
        let lesson = self.lesson_at_mut(s, l)?;
        let title = title.into();
        if lesson.title == title {
            return Ok(());
        }
        lesson.title = title;
        let id = lesson.id.clone();
        self.dirty.mark_lesson(&id, |m| m.title = true);
        Ok(())
    }

    /// Replace a lesson's content subtree in one assignment.
    ///
    /// Changing the content *kind* is only allowed while the lesson is
    /// still a draft; once persisted, the kind is immutable.
    pub fn set_lesson_content(
        &mut self,
        s: usize,
        l: usize,
        content: LessonContent,
    ) -> Result<(), StructuralViolation> {
        let lesson = self.lesson_at_mut(s, l)?;
        if lesson.id.is_persisted() && lesson.kind() != content.kind() {
            return Err(StructuralViolation::KindImmutable);
        }
        if lesson.content == content {
            return Ok(());
        }
        lesson.content = content;
        let id = lesson.id.clone();
        self.dirty.mark_lesson(&id, |m| m.content = true);
        Ok(())
    }

    /// Switch a draft lesson to the other kind, resetting its content.
    pub fn set_lesson_kind(
        &mut self,
        s: usize,
        l: usize,
        kind: LessonKind,
    ) -> Result<(), StructuralViolation> {
        let lesson = self.lesson_at_mut(s, l)?;
        if lesson.kind() == kind {
            return Ok(());
        }
        self.set_lesson_content(s, l, LessonContent::empty(kind))
    }

    pub fn set_question_text(
        &mut self,
        s: usize,
        l: usize,
        q: usize,
        text: impl Into<String>,
    ) -> Result<(), StructuralViolation> {
        self.mutate_question(s, l, q, |question| question.question_text = text.into())
    }

    pub fn set_question_option(
        &mut self,
        s: usize,
        l: usize,
        q: usize,
        choice: AnswerChoice,
        value: impl Into<String>,
    ) -> Result<(), StructuralViolation> {
        self.mutate_question(s, l, q, |question| {
            question.options[choice.index()] = value.into()
        })
    }

    pub fn set_question_answer(
        &mut self,
        s: usize,
        l: usize,
        q: usize,
        answer: AnswerChoice,
    ) -> Result<(), StructuralViolation> {
        self.mutate_question(s, l, q, |question| question.correct_answer = answer)
    }

    pub fn set_question_explanation(
        &mut self,
        s: usize,
        l: usize,
        q: usize,
        explanation: Option<String>,
    ) -> Result<(), StructuralViolation> {
        self.mutate_question(s, l, q, |question| question.explanation = explanation)
    }

    fn mutate_question(
        &mut self,
        s: usize,
        l: usize,
        q: usize,
        mutate: impl FnOnce(&mut QuizQuestion),
    ) -> Result<(), StructuralViolation> {
        mutate(self.quiz_question_at_mut(s, l, q)?);
        let id = self.lesson_at_mut(s, l)?.id.clone();
        self.dirty.mark_lesson(&id, |m| m.content = true);
        Ok(())
    }

    // ---- reordering ---------------------------------------------------

    /// Move a section to a new position. A no-op drop leaves indices and
    /// the reorder flag untouched.
    pub fn move_section(&mut self, from: usize, to: usize) -> Result<(), StructuralViolation> {
        if reorder::move_item(&mut self.sections, from, to)? {
            self.dirty.set_sections_reordered();
        }
        Ok(())
    }

    pub fn move_section_up(&mut self, s: usize) -> Result<(), StructuralViolation> {
        if reorder::move_up(&mut self.sections, s)? {
            self.dirty.set_sections_reordered();
        }
        Ok(())
    }

    pub fn move_section_down(&mut self, s: usize) -> Result<(), StructuralViolation> {
        if reorder::move_down(&mut self.sections, s)? {
            self.dirty.set_sections_reordered();
        }
        Ok(())
    }

    /// Move a lesson within its section.
    pub fn move_lesson(&mut self, s: usize, from: usize, to: usize) -> Result<(), StructuralViolation> {
        let section = self.section_at_mut(s)?;
        let moved = reorder::move_item(&mut section.lessons, from, to)?;
        if moved {
            let id = section.id.clone();
            self.dirty.mark_lessons_reordered(&id);
        }
        Ok(())
    }

    pub fn move_lesson_up(&mut self, s: usize, l: usize) -> Result<(), StructuralViolation> {
        let section = self.section_at_mut(s)?;
        let moved = reorder::move_up(&mut section.lessons, l)?;
        if moved {
            let id = section.id.clone();
            self.dirty.mark_lessons_reordered(&id);
        }
        Ok(())
    }

    pub fn move_lesson_down(&mut self, s: usize, l: usize) -> Result<(), StructuralViolation> {
        let section = self.section_at_mut(s)?;
        let moved = reorder::move_down(&mut section.lessons, l)?;
        if moved {
            let id = section.id.clone();
            self.dirty.mark_lessons_reordered(&id);
        }
        Ok(())
    }

    /// Move a question within its quiz. Question order rides inside the
    /// lesson payload, so this marks content dirty instead of raising a
    /// reorder flag.
    pub fn move_question(
        &mut self,
        s: usize,
        l: usize,
        from: usize,
        to: usize,
    ) -> Result<(), StructuralViolation> {
        let lesson = self.lesson_at_mut(s, l)?;
        let LessonContent::Quiz(quiz) = &mut lesson.content else {
            return Err(StructuralViolation::NotAQuizLesson);
        };
        let moved = reorder::move_item(&mut quiz.questions, from, to)?;
        if moved {
            let id = lesson.id.clone();
            self.dirty.mark_lesson(&id, |m| m.content = true);
        }
        Ok(())
    }

    // ---- local removal (used by the deletion pipeline) ----------------

    /// Splice a section out of the tree, renumber siblings, and drop its
    /// marks. Callers enforce the structural guards first.
    pub(crate) fn remove_section_local(&mut self, s: usize) -> Result<Section, StructuralViolation> {
        self.section_at(s)?;
        let section = self.sections.remove(s);
        reorder::restamp(&mut self.sections);
        self.dirty.forget_section(&section);
        Ok(section)
    }

    /// Splice a lesson out of its section, renumber siblings, drop marks.
    pub(crate) fn remove_lesson_local(
        &mut self,
        s: usize,
        l: usize,
    ) -> Result<Lesson, StructuralViolation> {
        let section = self.section_at_mut(s)?;
        if l >= section.lessons.len() {
            return Err(StructuralViolation::PathOutOfBounds(format!(
                "section[{s}].lesson[{l}]"
            )));
        }
        let lesson = section.lessons.remove(l);
        reorder::restamp(&mut section.lessons);
        self.dirty.forget_lesson(&lesson);
        Ok(lesson)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LessonKind, Section};

    fn persisted_section(id: &str, title: &str) -> Section {
        let mut section = Section::draft(0);
        section.id = EntityId::Persisted(id.to_string());
        section.title = title.to_string();
        section.description = "desc".to_string();
        section.lessons[0].id = EntityId::Persisted(format!("{id}-l0"));
        section.lessons[0].title = "Lesson".to_string();
        section
    }

    fn draft_with_two_sections() -> CourseDraft {
        let mut a = persisted_section("s-1", "One");
        let mut b = persisted_section("s-2", "Two");
        a.order_index = 0;
        b.order_index = 1;
        CourseDraft::from_persisted("c-1", vec![a, b])
    }

    #[test]
    fn loaded_draft_starts_clean() {
        let draft = draft_with_two_sections();
        assert!(!draft.has_unsaved_changes());
        assert!(draft.has_existing_content());
    }

    #[test]
    fn field_edit_marks_exactly_that_field() {
        let mut draft = draft_with_two_sections();
        draft.set_section_description(0, "new description").unwrap();

        let marks = draft.dirty().section_marks(&draft.sections()[0].id);
        assert!(marks.description);
        assert!(!marks.title);
        assert!(draft.has_unsaved_changes());

        // The untouched sibling stays clean.
        let sibling = draft.dirty().section_marks(&draft.sections()[1].id);
        assert!(!sibling.any());
    }

    #[test]
    fn setting_identical_value_stays_clean() {
        let mut draft = draft_with_two_sections();
        draft.set_section_title(0, "One").unwrap();
        assert!(!draft.has_unsaved_changes());
    }

    #[test]
    fn reorder_sets_flag_not_field_dirtiness() {
        let mut draft = draft_with_two_sections();
        draft.move_section(1, 0).unwrap();

        assert!(draft.dirty().sections_reordered());
        assert!(!draft.dirty().section_marks(&draft.sections()[0].id).any());
        assert_eq!(draft.sections()[0].title, "Two");
        assert_eq!(draft.sections()[0].order_index, 0);
        assert_eq!(draft.sections()[1].order_index, 1);
    }

    #[test]
    fn noop_drop_leaves_reorder_flag_unset() {
        let mut draft = draft_with_two_sections();
        draft.move_section(1, 1).unwrap();
        assert!(!draft.dirty().sections_reordered());
        assert!(!draft.has_unsaved_changes());
    }

    #[test]
    fn inserted_section_is_draft_and_fully_dirty() {
        let mut draft = draft_with_two_sections();
        let at = draft.insert_section(1);
        let section = &draft.sections()[at];
        assert!(section.id.is_draft());
        assert_eq!(section.order_index, 1);
        assert!(draft.dirty().section_marks(&section.id).any());
        // Siblings were renumbered around the insertion.
        let indices: Vec<u32> = draft.sections().iter().map(|s| s.order_index).collect();
        assert_eq!(indices, [0, 1, 2]);
    }

    #[test]
    fn kind_change_is_rejected_once_persisted() {
        let mut draft = draft_with_two_sections();
        let err = draft.set_lesson_kind(0, 0, LessonKind::Quiz).unwrap_err();
        assert!(matches!(err, StructuralViolation::KindImmutable));

        // A draft lesson can still switch kinds.
        draft.insert_lesson(0, 1, LessonKind::Video).unwrap();
        draft.set_lesson_kind(0, 1, LessonKind::Quiz).unwrap();
        assert_eq!(draft.sections()[0].lessons[1].kind(), LessonKind::Quiz);
    }

    #[test]
    fn discard_reverts_to_baseline() {
        let mut draft = draft_with_two_sections();
        draft.set_section_title(0, "Edited").unwrap();
        draft.insert_section(2);
        draft.move_section(0, 1).unwrap();

        draft.discard();
        assert!(!draft.has_unsaved_changes());
        assert_eq!(draft.sections().len(), 2);
        assert_eq!(draft.sections()[0].title, "One");
    }

    #[test]
    fn question_edits_mark_lesson_content() {
        let mut draft = draft_with_two_sections();
        draft.insert_lesson(0, 1, LessonKind::Quiz).unwrap();
        draft.insert_question(0, 1, 0).unwrap();
        draft.set_question_text(0, 1, 0, "Why?").unwrap();

        let lesson_id = draft.sections()[0].lessons[1].id.clone();
        assert!(draft.dirty().lesson_marks(&lesson_id).content);
    }

    #[test]
    fn question_reorder_marks_content_not_reorder_flag() {
        let mut draft = draft_with_two_sections();
        draft.insert_lesson(0, 1, LessonKind::Quiz).unwrap();
        draft.insert_question(0, 1, 0).unwrap();
        draft.insert_question(0, 1, 1).unwrap();
        let lesson_id = draft.sections()[0].lessons[1].id.clone();
        draft.dirty_mut().clear_lesson_marks(&lesson_id);

        draft.move_question(0, 1, 0, 1).unwrap();
        assert!(draft.dirty().lesson_marks(&lesson_id).content);
        assert!(!draft.dirty().lessons_reordered(&draft.sections()[0].id));
    }

    #[test]
    fn local_removal_renumbers_and_forgets_marks() {
        let mut draft = draft_with_two_sections();
        draft.set_section_title(0, "Edited").unwrap();
        let removed = draft.remove_section_local(0).unwrap();
        assert_eq!(removed.title, "Edited");
        assert_eq!(draft.sections().len(), 1);
        assert_eq!(draft.sections()[0].order_index, 0);
        assert!(!draft.dirty().section_marks(&removed.id).any());
    }
}
