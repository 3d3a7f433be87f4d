//! End-to-end save scenarios against the in-memory fake client.
//!
//! Each test drives the public session API exactly as a UI would and then
//! asserts the precise sequence of remote calls the fake recorded.

use std::sync::Arc;

use courseloom_api::{CourseApi, FakeCourseClient, RecordedCall, SectionPayload};
use courseloom_core::{
    CourseDraft, EditError, EditSession, EntityId, Lesson, LessonKind, SaveStep, Section,
};

const COURSE: &str = "course-1";

/// Create a persisted section with video lessons through the fake API and
/// mirror it as a local tree, the way a fetched course would load.
async fn seed_section(
    fake: &FakeCourseClient,
    title: &str,
    lesson_titles: &[&str],
) -> Section {
    let created = fake
        .create_section(
            COURSE,
            &SectionPayload {
                title: title.to_string(),
                description: format!("{title} description"),
            },
        )
        .await
        .unwrap();

    let mut lessons = Vec::new();
    for (i, lesson_title) in lesson_titles.iter().enumerate() {
        let mut lesson = Lesson::draft(LessonKind::Video, i as u32);
        let lesson_created = fake
            .create_lesson(
                &created.id,
                &courseloom_api::LessonPayload {
                    title: lesson_title.to_string(),
                    body: courseloom_api::LessonBody::Video {
                        upload_id: None,
                        url: None,
                        duration_seconds: None,
                    },
                },
            )
            .await
            .unwrap();
        lesson.id = EntityId::Persisted(lesson_created.id);
        lesson.title = lesson_title.to_string();
        lessons.push(lesson);
    }

    Section {
        id: EntityId::Persisted(created.id),
        title: title.to_string(),
        description: format!("{title} description"),
        order_index: created.order_index,
        lessons,
    }
}

async fn session_with_sections(
    fake: &Arc<FakeCourseClient>,
    titles: &[&str],
) -> EditSession {
    let mut sections = Vec::new();
    for title in titles {
        sections.push(seed_section(fake, title, &["Lesson one"]).await);
    }
    fake.clear_calls().await;
    EditSession::new(
        fake.clone() as Arc<dyn CourseApi>,
        CourseDraft::from_persisted(COURSE, sections),
    )
}

// Scenario A: new section with one video lesson; one create_section then
// one create_lesson, both placeholder ids replaced by the returned ids.
#[tokio::test]
async fn create_section_with_lesson_issues_parent_then_child() {
    let fake = Arc::new(FakeCourseClient::new());
    let mut session = EditSession::new(
        fake.clone() as Arc<dyn CourseApi>,
        CourseDraft::new(COURSE),
    );

    let s = session.draft_mut().insert_section(0);
    session.draft_mut().set_section_title(s, "Intro").unwrap();
    session
        .draft_mut()
        .set_section_description(s, "Getting started")
        .unwrap();
    session.draft_mut().set_lesson_title(s, 0, "Welcome").unwrap();

    let report = session.save().await.unwrap();
    assert!(report.succeeded());

    let calls = fake.calls().await;
    assert_eq!(calls.len(), 2);
    let RecordedCall::CreateSection { title, .. } = &calls[0] else {
        panic!("expected create_section first, got {:?}", calls[0]);
    };
    assert_eq!(title, "Intro");
    let RecordedCall::CreateLesson { section_id, title } = &calls[1] else {
        panic!("expected create_lesson second, got {:?}", calls[1]);
    };
    assert_eq!(title, "Welcome");

    // Both placeholders were rewritten in place to the server ids.
    let section = &session.draft().sections()[0];
    assert_eq!(section.id.persisted(), Some(section_id.as_str()));
    assert!(section.lessons[0].id.is_persisted());
    assert_eq!(section.order_index, 0);
    assert!(!session.draft().has_unsaved_changes());
}

// Scenario B: drag S2 above S1; exactly one reorder_sections call with
// [S2, S1] and no create/update calls.
#[tokio::test]
async fn reorder_submits_one_batch_and_nothing_else() {
    let fake = Arc::new(FakeCourseClient::new());
    let mut session = session_with_sections(&fake, &["One", "Two"]).await;
    let s1 = session.draft().sections()[0].id.raw().to_string();
    let s2 = session.draft().sections()[1].id.raw().to_string();

    session.draft_mut().move_section(1, 0).unwrap();
    let report = session.save().await.unwrap();
    assert!(report.succeeded());

    let calls = fake.calls().await;
    assert_eq!(
        calls,
        vec![RecordedCall::ReorderSections {
            course_id: COURSE.to_string(),
            section_ids: vec![s2, s1],
        }]
    );
}

// Scenario C: edit only S1's description; exactly one update_section for
// S1 and zero calls for S2.
#[tokio::test]
async fn field_edit_updates_only_the_touched_section() {
    let fake = Arc::new(FakeCourseClient::new());
    let mut session = session_with_sections(&fake, &["One", "Two"]).await;
    let s1 = session.draft().sections()[0].id.raw().to_string();

    session
        .draft_mut()
        .set_section_description(0, "rewritten")
        .unwrap();
    let report = session.save().await.unwrap();
    assert!(report.succeeded());

    let calls = fake.calls().await;
    assert_eq!(
        calls,
        vec![RecordedCall::UpdateSection {
            course_id: COURSE.to_string(),
            section_id: s1,
        }]
    );
}

// Scenario D: deleting a never-saved lesson is local-only and renumbers
// its siblings.
#[tokio::test]
async fn placeholder_lesson_deletes_without_network() {
    let fake = Arc::new(FakeCourseClient::new());
    let mut session = session_with_sections(&fake, &["One"]).await;

    session
        .draft_mut()
        .insert_lesson(0, 0, LessonKind::Video)
        .unwrap();
    session.delete_lesson(0, 0, false).await.unwrap();

    assert!(fake.calls().await.is_empty());
    let lessons = &session.draft().sections()[0].lessons;
    assert_eq!(lessons.len(), 1);
    assert_eq!(lessons[0].order_index, 0);
}

// Scenario E: create_section fails; no lesson calls are issued for that
// section's children and its dirty marks survive for the retry.
#[tokio::test]
async fn failed_section_create_blocks_children_and_keeps_dirty_marks() {
    let fake = Arc::new(FakeCourseClient::new());
    let mut session = session_with_sections(&fake, &["One"]).await;

    // A clean persisted section edit that should succeed first (P4: work
    // completed before the failure point is not resubmitted on retry).
    session.draft_mut().set_section_title(0, "One renamed").unwrap();

    let s = session.draft_mut().insert_section(1);
    session.draft_mut().set_section_title(s, "Broken").unwrap();
    session
        .draft_mut()
        .set_section_description(s, "desc")
        .unwrap();
    session.draft_mut().set_lesson_title(s, 0, "Child").unwrap();

    fake.fail_next("create_section").await;
    let report = session.save().await.unwrap();
    assert!(!report.succeeded());
    assert_eq!(report.applied.len(), 1);
    assert!(matches!(report.applied[0], SaveStep::UpdateSection { .. }));

    let calls = fake.calls().await;
    // update S1, then the failed create; never a lesson call.
    assert_eq!(calls.len(), 2);
    assert!(matches!(calls[1], RecordedCall::CreateSection { .. }));
    assert!(!calls
        .iter()
        .any(|c| matches!(c, RecordedCall::CreateLesson { .. })));

    // The failed section is still a dirty draft; the renamed section is
    // clean and keeps its stable id.
    let sections = session.draft().sections();
    assert!(sections[1].id.is_draft());
    assert!(session.draft().has_unsaved_changes());
    assert!(!session.draft().dirty().section_marks(&sections[0].id).any());

    // Retry resumes at the failure point: one create_section, one
    // create_lesson, no second update for the renamed section.
    fake.clear_calls().await;
    let retry = session.save().await.unwrap();
    assert!(retry.succeeded());
    let calls = fake.calls().await;
    assert_eq!(calls.len(), 2);
    assert!(matches!(calls[0], RecordedCall::CreateSection { .. }));
    assert!(matches!(calls[1], RecordedCall::CreateLesson { .. }));
    assert!(!session.draft().has_unsaved_changes());
}

// A failing update on the first section stops the walk before the later
// sections; every title mark survives and the retry replays all three
// updates in tree order.
#[tokio::test]
async fn failed_update_keeps_marks_and_blocks_later_sections() {
    let fake = Arc::new(FakeCourseClient::new());
    let mut session = session_with_sections(&fake, &["One", "Two", "Three"]).await;

    for i in 0..3 {
        session
            .draft_mut()
            .set_section_title(i, format!("Renamed {i}"))
            .unwrap();
    }

    fake.fail_next("update_section").await;
    let report = session.save().await.unwrap();
    assert!(!report.succeeded());
    assert!(report.applied.is_empty());
    assert_eq!(fake.calls().await.len(), 1);

    let sections = session.draft().sections();
    for section in sections {
        assert!(session.draft().dirty().section_marks(&section.id).title);
    }

    fake.clear_calls().await;
    let expected: Vec<String> = session
        .draft()
        .sections()
        .iter()
        .map(|s| s.id.raw().to_string())
        .collect();
    let retry = session.save().await.unwrap();
    assert!(retry.succeeded());

    let calls = fake.calls().await;
    assert_eq!(calls.len(), 3);
    for (call, id) in calls.iter().zip(&expected) {
        let RecordedCall::UpdateSection { section_id, .. } = call else {
            panic!("expected update_section, got {call:?}");
        };
        assert_eq!(section_id, id);
    }
    assert!(!session.draft().has_unsaved_changes());
}

// A section created and reordered in the same save: the reorder batch is
// built after id rewrite, so it carries the server-issued id.
#[tokio::test]
async fn reorder_batch_uses_ids_rewritten_by_the_same_save() {
    let fake = Arc::new(FakeCourseClient::new());
    let mut session = session_with_sections(&fake, &["One", "Two"]).await;

    let s = session.draft_mut().insert_section(2);
    session.draft_mut().set_section_title(s, "Three").unwrap();
    session.draft_mut().set_section_description(s, "d").unwrap();
    session.draft_mut().set_lesson_title(s, 0, "L").unwrap();
    session.draft_mut().move_section(2, 0).unwrap();

    let report = session.save().await.unwrap();
    assert!(report.succeeded(), "failure: {:?}", report.failure);

    let calls = fake.calls().await;
    let new_id = session.draft().sections()[0]
        .id
        .persisted()
        .expect("new section should be persisted")
        .to_string();
    let Some(RecordedCall::ReorderSections { section_ids, .. }) = calls.last() else {
        panic!("expected reorder_sections last, got {:?}", calls.last());
    };
    assert_eq!(section_ids[0], new_id);
    assert_eq!(section_ids.len(), 3);
}

// Lessons reordered inside a section that is itself created in the same
// save: the lessons-reordered flag follows the section's id rewrite.
#[tokio::test]
async fn lesson_reorder_flag_survives_section_id_rewrite() {
    let fake = Arc::new(FakeCourseClient::new());
    let mut session = session_with_sections(&fake, &["One"]).await;

    let s = session.draft_mut().insert_section(1);
    session.draft_mut().set_section_title(s, "New").unwrap();
    session.draft_mut().set_section_description(s, "d").unwrap();
    session.draft_mut().set_lesson_title(s, 0, "First").unwrap();
    session
        .draft_mut()
        .insert_lesson(s, 1, LessonKind::Video)
        .unwrap();
    session.draft_mut().set_lesson_title(s, 1, "Second").unwrap();
    session.draft_mut().move_lesson(s, 1, 0).unwrap();

    let report = session.save().await.unwrap();
    assert!(report.succeeded(), "failure: {:?}", report.failure);

    let stable = session.draft().sections()[1].id.persisted().unwrap();
    let calls = fake.calls().await;
    let Some(RecordedCall::ReorderLessons { section_id, lesson_ids }) = calls.last() else {
        panic!("expected reorder_lessons last, got {:?}", calls.last());
    };
    assert_eq!(section_id, stable);
    assert_eq!(lesson_ids.len(), 2);
    // The moved lesson leads the batch.
    assert_eq!(
        lesson_ids[0],
        session.draft().sections()[1].lessons[0].id.persisted().unwrap()
    );
}

// An invalid tree blocks the save before any network call.
#[tokio::test]
async fn validation_failure_blocks_all_submission() {
    let fake = Arc::new(FakeCourseClient::new());
    let mut session = EditSession::new(
        fake.clone() as Arc<dyn CourseApi>,
        CourseDraft::new(COURSE),
    );
    session.draft_mut().insert_section(0);

    let err = session.save().await.unwrap_err();
    assert!(matches!(err, EditError::Validation(_)));
    assert!(fake.calls().await.is_empty());
    assert!(session.draft().has_unsaved_changes());
}

// A clean draft saves as a no-op.
#[tokio::test]
async fn save_without_changes_issues_no_calls() {
    let fake = Arc::new(FakeCourseClient::new());
    let mut session = session_with_sections(&fake, &["One"]).await;

    let report = session.save().await.unwrap();
    assert!(report.succeeded());
    assert!(report.applied.is_empty());
    assert!(fake.calls().await.is_empty());
}

// A failing reorder submission leaves the reorder flag set for retry.
#[tokio::test]
async fn failed_reorder_keeps_flag_for_retry() {
    let fake = Arc::new(FakeCourseClient::new());
    let mut session = session_with_sections(&fake, &["One", "Two"]).await;

    session.draft_mut().move_section(1, 0).unwrap();
    fake.fail_next("reorder_sections").await;

    let report = session.save().await.unwrap();
    assert!(!report.succeeded());
    assert!(session.draft().dirty().sections_reordered());

    fake.clear_calls().await;
    let retry = session.save().await.unwrap();
    assert!(retry.succeeded());
    assert_eq!(fake.calls().await.len(), 1);
    assert!(!session.draft().has_unsaved_changes());
}
