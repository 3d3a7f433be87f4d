//! Trait abstracting course persistence operations.
//!
//! This trait allows swapping between the real `HttpCourseClient` and the
//! in-memory `FakeCourseClient`, so the editing engine and its tests run
//! the same code path with only the transport layer exchanged.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::{CreatedEntity, LessonPayload, LessonUpdate, SectionPayload};

/// Result type for API client operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Trait abstracting the remote course persistence API.
///
/// Implemented by:
/// - `HttpCourseClient` - real HTTP client for production
/// - `FakeCourseClient` - in-memory client for testing
///
/// Create calls return the server-issued id; the caller must issue at most
/// one create per locally drafted entity per save invocation, because a
/// retried create could duplicate the entity. Updates and deletes are
/// idempotent from the caller's perspective. The remote system rejects
/// lesson operations referencing a section id it has not issued.
#[async_trait]
pub trait CourseApi: Send + Sync {
    /// Create a section under a course. Returns the server-issued id and
    /// the position the section was created at.
    async fn create_section(
        &self,
        course_id: &str,
        payload: &SectionPayload,
    ) -> ApiResult<CreatedEntity>;

    /// Update a persisted section's title and description.
    async fn update_section(
        &self,
        course_id: &str,
        section_id: &str,
        payload: &SectionPayload,
    ) -> ApiResult<()>;

    /// Delete a persisted section and everything under it.
    async fn delete_section(&self, course_id: &str, section_id: &str) -> ApiResult<()>;

    /// Replace the order of a course's sections in one batch.
    /// `section_ids` is the complete list of stable ids in final order.
    async fn reorder_sections(&self, course_id: &str, section_ids: &[String]) -> ApiResult<()>;

    /// Create a lesson under a persisted section. Returns the server-issued
    /// id and the position the lesson was created at.
    async fn create_lesson(
        &self,
        section_id: &str,
        payload: &LessonPayload,
    ) -> ApiResult<CreatedEntity>;

    /// Update a persisted lesson. Only the fields present in `update` change.
    async fn update_lesson(
        &self,
        section_id: &str,
        lesson_id: &str,
        update: &LessonUpdate,
    ) -> ApiResult<()>;

    /// Delete a persisted lesson.
    async fn delete_lesson(&self, section_id: &str, lesson_id: &str) -> ApiResult<()>;

    /// Replace the order of one section's lessons in one batch.
    async fn reorder_lessons(&self, section_id: &str, lesson_ids: &[String]) -> ApiResult<()>;
}
