//! Fake course API client for testing.
//!
//! In-memory implementation of `CourseApi` that stores sections and lessons
//! locally instead of making HTTP requests. The fake lets the editing engine
//! run its full save path unchanged, with only the transport swapped.
//!
//! Beyond storage it records every call it receives, in order, so tests can
//! assert exact call sequences (which operations were issued, with which
//! ids, and in which order). Individual operations can be scripted to fail
//! to exercise the stop-on-first-failure path.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::info;

use crate::client::{ApiResult, CourseApi};
use crate::error::ApiError;
use crate::models::{CreatedEntity, LessonPayload, LessonUpdate, SectionPayload};

/// One call received by the fake, with the arguments tests care about.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    CreateSection {
        course_id: String,
        title: String,
    },
    UpdateSection {
        course_id: String,
        section_id: String,
    },
    DeleteSection {
        course_id: String,
        section_id: String,
    },
    ReorderSections {
        course_id: String,
        section_ids: Vec<String>,
    },
    CreateLesson {
        section_id: String,
        title: String,
    },
    UpdateLesson {
        section_id: String,
        lesson_id: String,
    },
    DeleteLesson {
        section_id: String,
        lesson_id: String,
    },
    ReorderLessons {
        section_id: String,
        lesson_ids: Vec<String>,
    },
}

#[derive(Debug, Clone)]
struct StoredSection {
    id: String,
    course_id: String,
    payload: SectionPayload,
    order_index: u32,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct StoredLesson {
    id: String,
    section_id: String,
    payload: LessonPayload,
    order_index: u32,
    updated_at: DateTime<Utc>,
}

/// Fake course API client for testing.
///
/// Stores sections and lessons in-memory. Create calls issue uuid ids, so
/// tests observe the same placeholder-to-stable id rewrite the production
/// client produces. Lesson creation is rejected for unknown section ids,
/// matching the remote system's parent-before-child rule.
#[derive(Default)]
pub struct FakeCourseClient {
    sections: RwLock<HashMap<String, StoredSection>>,
    lessons: RwLock<HashMap<String, StoredLesson>>,
    calls: RwLock<Vec<RecordedCall>>,
    failures: RwLock<HashMap<&'static str, u32>>,
}

impl FakeCourseClient {
    pub fn new() -> Self {
        info!("[FakeCourseClient] Creating new fake client");
        Self::default()
    }

    fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Script the next invocation of `operation` to fail with a rejection.
    pub async fn fail_next(&self, operation: &'static str) {
        *self.failures.write().await.entry(operation).or_insert(0) += 1;
    }

    /// Every call received so far, in order.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    pub async fn clear_calls(&self) {
        self.calls.write().await.clear();
    }

    /// Section ids currently stored, in their stored order.
    pub async fn section_ids(&self, course_id: &str) -> Vec<String> {
        let sections = self.sections.read().await;
        let mut rows: Vec<_> = sections
            .values()
            .filter(|s| s.course_id == course_id)
            .cloned()
            .collect();
        rows.sort_by_key(|s| s.order_index);
        rows.into_iter().map(|s| s.id).collect()
    }

    /// Lesson ids currently stored under a section, in stored order.
    pub async fn lesson_ids(&self, section_id: &str) -> Vec<String> {
        let lessons = self.lessons.read().await;
        let mut rows: Vec<_> = lessons
            .values()
            .filter(|l| l.section_id == section_id)
            .cloned()
            .collect();
        rows.sort_by_key(|l| l.order_index);
        rows.into_iter().map(|l| l.id).collect()
    }

    /// When the section was last written, if it exists.
    pub async fn section_updated_at(&self, section_id: &str) -> Option<DateTime<Utc>> {
        self.sections
            .read()
            .await
            .get(section_id)
            .map(|s| s.updated_at)
    }

    /// When the lesson was last written, if it exists.
    pub async fn lesson_updated_at(&self, lesson_id: &str) -> Option<DateTime<Utc>> {
        self.lessons
            .read()
            .await
            .get(lesson_id)
            .map(|l| l.updated_at)
    }

    pub async fn lesson_count(&self, section_id: &str) -> usize {
        self.lessons
            .read()
            .await
            .values()
            .filter(|l| l.section_id == section_id)
            .count()
    }

    async fn record(&self, call: RecordedCall) {
        self.calls.write().await.push(call);
    }

    async fn check_scripted_failure(&self, operation: &'static str) -> ApiResult<()> {
        let mut failures = self.failures.write().await;
        if let Some(remaining) = failures.get_mut(operation) {
            if *remaining > 0 {
                *remaining -= 1;
                info!("[FakeCourseClient] scripted failure for {}", operation);
                return Err(ApiError::Rejected {
                    operation,
                    status: 500,
                    message: "scripted failure".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CourseApi for FakeCourseClient {
    async fn create_section(
        &self,
        course_id: &str,
        payload: &SectionPayload,
    ) -> ApiResult<CreatedEntity> {
        self.record(RecordedCall::CreateSection {
            course_id: course_id.to_string(),
            title: payload.title.clone(),
        })
        .await;
        self.check_scripted_failure("create_section").await?;

        let mut sections = self.sections.write().await;
        let order_index = sections
            .values()
            .filter(|s| s.course_id == course_id)
            .count() as u32;
        let id = Self::generate_id();
        sections.insert(
            id.clone(),
            StoredSection {
                id: id.clone(),
                course_id: course_id.to_string(),
                payload: payload.clone(),
                order_index,
                updated_at: Utc::now(),
            },
        );
        info!("[FakeCourseClient] created section {}", id);
        Ok(CreatedEntity { id, order_index })
    }

    async fn update_section(
        &self,
        course_id: &str,
        section_id: &str,
        payload: &SectionPayload,
    ) -> ApiResult<()> {
        self.record(RecordedCall::UpdateSection {
            course_id: course_id.to_string(),
            section_id: section_id.to_string(),
        })
        .await;
        self.check_scripted_failure("update_section").await?;

        let mut sections = self.sections.write().await;
        let section = sections
            .get_mut(section_id)
            .ok_or_else(|| ApiError::UnknownEntity {
                entity: "section",
                id: section_id.to_string(),
            })?;
        section.payload = payload.clone();
        section.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_section(&self, course_id: &str, section_id: &str) -> ApiResult<()> {
        self.record(RecordedCall::DeleteSection {
            course_id: course_id.to_string(),
            section_id: section_id.to_string(),
        })
        .await;
        self.check_scripted_failure("delete_section").await?;

        let mut sections = self.sections.write().await;
        if sections.remove(section_id).is_none() {
            return Err(ApiError::UnknownEntity {
                entity: "section",
                id: section_id.to_string(),
            });
        }
        self.lessons
            .write()
            .await
            .retain(|_, l| l.section_id != section_id);
        Ok(())
    }

    async fn reorder_sections(&self, course_id: &str, section_ids: &[String]) -> ApiResult<()> {
        self.record(RecordedCall::ReorderSections {
            course_id: course_id.to_string(),
            section_ids: section_ids.to_vec(),
        })
        .await;
        self.check_scripted_failure("reorder_sections").await?;

        let mut sections = self.sections.write().await;
        for id in section_ids {
            if !sections.contains_key(id) {
                return Err(ApiError::UnknownEntity {
                    entity: "section",
                    id: id.clone(),
                });
            }
        }
        for (index, id) in section_ids.iter().enumerate() {
            if let Some(section) = sections.get_mut(id) {
                section.order_index = index as u32;
            }
        }
        Ok(())
    }

    async fn create_lesson(
        &self,
        section_id: &str,
        payload: &LessonPayload,
    ) -> ApiResult<CreatedEntity> {
        self.record(RecordedCall::CreateLesson {
            section_id: section_id.to_string(),
            title: payload.title.clone(),
        })
        .await;
        self.check_scripted_failure("create_lesson").await?;

        if !self.sections.read().await.contains_key(section_id) {
            return Err(ApiError::UnknownEntity {
                entity: "section",
                id: section_id.to_string(),
            });
        }

        let mut lessons = self.lessons.write().await;
        let order_index = lessons
            .values()
            .filter(|l| l.section_id == section_id)
            .count() as u32;
        let id = Self::generate_id();
        lessons.insert(
            id.clone(),
            StoredLesson {
                id: id.clone(),
                section_id: section_id.to_string(),
                payload: payload.clone(),
                order_index,
                updated_at: Utc::now(),
            },
        );
        info!("[FakeCourseClient] created lesson {}", id);
        Ok(CreatedEntity { id, order_index })
    }

    async fn update_lesson(
        &self,
        section_id: &str,
        lesson_id: &str,
        update: &LessonUpdate,
    ) -> ApiResult<()> {
        self.record(RecordedCall::UpdateLesson {
            section_id: section_id.to_string(),
            lesson_id: lesson_id.to_string(),
        })
        .await;
        self.check_scripted_failure("update_lesson").await?;

        let mut lessons = self.lessons.write().await;
        let lesson = lessons
            .get_mut(lesson_id)
            .ok_or_else(|| ApiError::UnknownEntity {
                entity: "lesson",
                id: lesson_id.to_string(),
            })?;
        if let Some(title) = &update.title {
            lesson.payload.title = title.clone();
        }
        if let Some(body) = &update.body {
            lesson.payload.body = body.clone();
        }
        lesson.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_lesson(&self, section_id: &str, lesson_id: &str) -> ApiResult<()> {
        self.record(RecordedCall::DeleteLesson {
            section_id: section_id.to_string(),
            lesson_id: lesson_id.to_string(),
        })
        .await;
        self.check_scripted_failure("delete_lesson").await?;

        let mut lessons = self.lessons.write().await;
        if lessons.remove(lesson_id).is_none() {
            return Err(ApiError::UnknownEntity {
                entity: "lesson",
                id: lesson_id.to_string(),
            });
        }
        Ok(())
    }

    async fn reorder_lessons(&self, section_id: &str, lesson_ids: &[String]) -> ApiResult<()> {
        self.record(RecordedCall::ReorderLessons {
            section_id: section_id.to_string(),
            lesson_ids: lesson_ids.to_vec(),
        })
        .await;
        self.check_scripted_failure("reorder_lessons").await?;

        let mut lessons = self.lessons.write().await;
        for id in lesson_ids {
            if !lessons.contains_key(id) {
                return Err(ApiError::UnknownEntity {
                    entity: "lesson",
                    id: id.clone(),
                });
            }
        }
        for (index, id) in lesson_ids.iter().enumerate() {
            if let Some(lesson) = lessons.get_mut(id) {
                lesson.order_index = index as u32;
            }
        }
        Ok(())
    }
}
