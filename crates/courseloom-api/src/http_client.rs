//! Real HTTP client for the course persistence API.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::client::{ApiResult, CourseApi};
use crate::config::CourseApiConfig;
use crate::error::ApiError;
use crate::models::{CreatedEntity, LessonPayload, LessonUpdate, SectionPayload};

use async_trait::async_trait;

/// HTTP implementation of `CourseApi`.
pub struct HttpCourseClient {
    http: reqwest::Client,
    config: CourseApiConfig,
}

impl HttpCourseClient {
    pub fn new(config: CourseApiConfig) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Transport {
                operation: "client_init",
                source: Box::new(e),
            })?;
        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn send<B: Serialize>(
        &self,
        operation: &'static str,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ApiResult<reqwest::Response> {
        debug!("[HttpCourseClient] {} {} {}", operation, method, path);
        let mut request = self
            .http
            .request(method, self.url(path))
            .bearer_auth(&self.config.api_token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| ApiError::Transport {
            operation,
            source: Box::new(e),
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(ApiError::Rejected {
            operation,
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        operation: &'static str,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ApiResult<T> {
        let response = self.send(operation, method, path, body).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse {
                operation,
                detail: e.to_string(),
            })
    }

    async fn send_unit<B: Serialize>(
        &self,
        operation: &'static str,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ApiResult<()> {
        self.send(operation, method, path, body).await.map(|_| ())
    }
}

#[derive(Serialize)]
struct OrderBody<'a> {
    ids: &'a [String],
}

#[async_trait]
impl CourseApi for HttpCourseClient {
    async fn create_section(
        &self,
        course_id: &str,
        payload: &SectionPayload,
    ) -> ApiResult<CreatedEntity> {
        self.send_json(
            "create_section",
            Method::POST,
            &format!("/courses/{course_id}/sections"),
            Some(payload),
        )
        .await
    }

    async fn update_section(
        &self,
        course_id: &str,
        section_id: &str,
        payload: &SectionPayload,
    ) -> ApiResult<()> {
        self.send_unit(
            "update_section",
            Method::PATCH,
            &format!("/courses/{course_id}/sections/{section_id}"),
            Some(payload),
        )
        .await
    }

    async fn delete_section(&self, course_id: &str, section_id: &str) -> ApiResult<()> {
        self.send_unit::<()>(
            "delete_section",
            Method::DELETE,
            &format!("/courses/{course_id}/sections/{section_id}"),
            None,
        )
        .await
    }

    async fn reorder_sections(&self, course_id: &str, section_ids: &[String]) -> ApiResult<()> {
        self.send_unit(
            "reorder_sections",
            Method::PUT,
            &format!("/courses/{course_id}/sections/order"),
            Some(&OrderBody { ids: section_ids }),
        )
        .await
    }

    async fn create_lesson(
        &self,
        section_id: &str,
        payload: &LessonPayload,
    ) -> ApiResult<CreatedEntity> {
        self.send_json(
            "create_lesson",
            Method::POST,
            &format!("/sections/{section_id}/lessons"),
            Some(payload),
        )
        .await
    }

    async fn update_lesson(
        &self,
        section_id: &str,
        lesson_id: &str,
        update: &LessonUpdate,
    ) -> ApiResult<()> {
        self.send_unit(
            "update_lesson",
            Method::PATCH,
            &format!("/sections/{section_id}/lessons/{lesson_id}"),
            Some(update),
        )
        .await
    }

    async fn delete_lesson(&self, section_id: &str, lesson_id: &str) -> ApiResult<()> {
        self.send_unit::<()>(
            "delete_lesson",
            Method::DELETE,
            &format!("/sections/{section_id}/lessons/{lesson_id}"),
            None,
        )
        .await
    }

    async fn reorder_lessons(&self, section_id: &str, lesson_ids: &[String]) -> ApiResult<()> {
        self.send_unit(
            "reorder_lessons",
            Method::PUT,
            &format!("/sections/{section_id}/lessons/order"),
            Some(&OrderBody { ids: lesson_ids }),
        )
        .await
    }
}
