//! Remote persistence contract for the courseloom editing engine.
//!
//! This crate defines the API surface the editing engine reconciles drafts
//! against:
//!
//! - `client` - `CourseApi` trait for abstraction over real/fake clients
//! - `http_client` - `HttpCourseClient` (HTTP client)
//! - `fake_client` - `FakeCourseClient` for testing (in-memory API client)
//! - `models` - wire request/response types
//! - `config` - client configuration
//! - `error` - API error taxonomy

pub mod client;
pub mod config;
pub mod error;
pub mod fake_client;
pub mod http_client;
pub mod models;

pub use client::{ApiResult, CourseApi};
pub use config::{ConfigError, CourseApiConfig};
pub use error::ApiError;
pub use fake_client::{FakeCourseClient, RecordedCall};
pub use http_client::HttpCourseClient;
pub use models::{
    CreatedEntity, LessonBody, LessonPayload, LessonUpdate, QuestionPayload, SectionPayload,
};
