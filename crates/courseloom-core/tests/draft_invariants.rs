//! Property-based invariants of the draft store.
//!
//! Random sequences of inserts, kind switches, and moves at every tree
//! level must keep sibling order indices exactly `0..n-1` and keep every
//! entity id unique across the tree.

use std::collections::HashSet;

use proptest::prelude::*;

use courseloom_core::{CourseDraft, LessonContent, LessonKind};

#[derive(Debug, Clone)]
enum Op {
    InsertSection(usize),
    InsertLesson(usize, usize),
    MakeQuiz(usize, usize),
    InsertQuestion(usize, usize, usize),
    MoveSection(usize, usize),
    MoveLesson(usize, usize, usize),
    MoveQuestion(usize, usize, usize, usize),
    RemoveQuestion(usize, usize, usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let ix = 0..8usize;
    prop_oneof![
        ix.clone().prop_map(Op::InsertSection),
        (ix.clone(), ix.clone()).prop_map(|(s, at)| Op::InsertLesson(s, at)),
        (ix.clone(), ix.clone()).prop_map(|(s, l)| Op::MakeQuiz(s, l)),
        (ix.clone(), ix.clone(), ix.clone()).prop_map(|(s, l, at)| Op::InsertQuestion(s, l, at)),
        (ix.clone(), ix.clone()).prop_map(|(from, to)| Op::MoveSection(from, to)),
        (ix.clone(), ix.clone(), ix.clone()).prop_map(|(s, f, t)| Op::MoveLesson(s, f, t)),
        (ix.clone(), ix.clone(), ix.clone(), ix.clone())
            .prop_map(|(s, l, f, t)| Op::MoveQuestion(s, l, f, t)),
        (ix.clone(), ix.clone(), ix).prop_map(|(s, l, q)| Op::RemoveQuestion(s, l, q)),
    ]
}

fn clamp(raw: usize, len: usize) -> Option<usize> {
    if len == 0 {
        None
    } else {
        Some(raw % len)
    }
}

fn apply(draft: &mut CourseDraft, op: &Op) {
    match *op {
        Op::InsertSection(at) => {
            draft.insert_section(at);
        }
        Op::InsertLesson(s, at) => {
            if let Some(s) = clamp(s, draft.sections().len()) {
                draft.insert_lesson(s, at, LessonKind::Video).unwrap();
            }
        }
        Op::MakeQuiz(s, l) => {
            if let Some(s) = clamp(s, draft.sections().len()) {
                if let Some(l) = clamp(l, draft.sections()[s].lessons.len()) {
                    draft.set_lesson_kind(s, l, LessonKind::Quiz).unwrap();
                }
            }
        }
        Op::InsertQuestion(s, l, at) => {
            if let Some(s) = clamp(s, draft.sections().len()) {
                if let Some(l) = clamp(l, draft.sections()[s].lessons.len()) {
                    // Only valid on quiz lessons; skip the rest.
                    if matches!(draft.sections()[s].lessons[l].content, LessonContent::Quiz(_)) {
                        draft.insert_question(s, l, at).unwrap();
                    }
                }
            }
        }
        Op::MoveSection(from, to) => {
            let len = draft.sections().len();
            if let (Some(from), Some(to)) = (clamp(from, len), clamp(to, len)) {
                draft.move_section(from, to).unwrap();
            }
        }
        Op::MoveLesson(s, from, to) => {
            if let Some(s) = clamp(s, draft.sections().len()) {
                let len = draft.sections()[s].lessons.len();
                if let (Some(from), Some(to)) = (clamp(from, len), clamp(to, len)) {
                    draft.move_lesson(s, from, to).unwrap();
                }
            }
        }
        Op::MoveQuestion(s, l, from, to) => {
            if let Some((s, l, len)) = question_list(draft, s, l) {
                if let (Some(from), Some(to)) = (clamp(from, len), clamp(to, len)) {
                    draft.move_question(s, l, from, to).unwrap();
                }
            }
        }
        Op::RemoveQuestion(s, l, q) => {
            if let Some((s, l, len)) = question_list(draft, s, l) {
                if let Some(q) = clamp(q, len) {
                    draft.remove_question(s, l, q).unwrap();
                }
            }
        }
    }
}

/// Resolve a (section, lesson) pair to a quiz lesson, if it is one.
fn question_list(draft: &CourseDraft, s: usize, l: usize) -> Option<(usize, usize, usize)> {
    let s = clamp(s, draft.sections().len())?;
    let l = clamp(l, draft.sections()[s].lessons.len())?;
    match &draft.sections()[s].lessons[l].content {
        LessonContent::Quiz(quiz) => Some((s, l, quiz.questions.len())),
        LessonContent::Video(_) => None,
    }
}

fn assert_invariants(draft: &CourseDraft) {
    let mut ids: HashSet<&str> = HashSet::new();
    let mut count = 0usize;

    for (s, section) in draft.sections().iter().enumerate() {
        assert_eq!(section.order_index as usize, s, "section index gap");
        assert!(ids.insert(section.id.raw()), "duplicate section id");
        count += 1;
        assert!(!section.lessons.is_empty(), "section lost its last lesson");

        for (l, lesson) in section.lessons.iter().enumerate() {
            assert_eq!(lesson.order_index as usize, l, "lesson index gap");
            assert!(ids.insert(lesson.id.raw()), "duplicate lesson id");
            count += 1;

            if let LessonContent::Quiz(quiz) = &lesson.content {
                for (q, question) in quiz.questions.iter().enumerate() {
                    assert_eq!(question.order_index as usize, q, "question index gap");
                    assert!(ids.insert(question.id.raw()), "duplicate question id");
                    count += 1;
                }
            }
        }
    }
    assert_eq!(ids.len(), count);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_edits_keep_indices_contiguous_and_ids_unique(
        ops in proptest::collection::vec(op_strategy(), 1..40)
    ) {
        let mut draft = CourseDraft::new("course-1");
        for op in &ops {
            apply(&mut draft, op);
        }
        assert_invariants(&draft);
    }

    #[test]
    fn discard_always_restores_the_baseline(
        ops in proptest::collection::vec(op_strategy(), 1..20)
    ) {
        let mut draft = CourseDraft::new("course-1");
        draft.insert_section(0);
        draft.set_section_title(0, "Base").unwrap();
        // Simulate a prior successful save by building from the tree.
        let mut draft = CourseDraft::from_persisted("course-1", draft.sections().to_vec());

        for op in &ops {
            apply(&mut draft, op);
        }
        draft.discard();
        prop_assert!(!draft.has_unsaved_changes());
        prop_assert_eq!(draft.sections().len(), 1);
        prop_assert_eq!(draft.sections()[0].title.as_str(), "Base");
    }
}
