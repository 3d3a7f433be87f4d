//! Wire models for the course persistence API.
//!
//! These types describe exactly what crosses the network. Client-only state
//! (draft ids, dirty markers, local order indices on quiz questions) never
//! appears here; the editing engine strips it before building a payload.

use serde::{Deserialize, Serialize};

/// Body of `create_section` / `update_section`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionPayload {
    pub title: String,
    pub description: String,
}

/// Response to a successful create call.
///
/// `order_index` is the position the remote system placed the entity at;
/// the engine keeps its local position and only adopts the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedEntity {
    pub id: String,
    #[serde(rename = "orderIndex")]
    pub order_index: u32,
}

/// Kind-specific part of a lesson payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LessonBody {
    Video {
        #[serde(skip_serializing_if = "Option::is_none")]
        upload_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        duration_seconds: Option<u32>,
    },
    Quiz {
        questions: Vec<QuestionPayload>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        source_documents: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        spreadsheet_import: Option<String>,
    },
}

/// Body of `create_lesson`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonPayload {
    pub title: String,
    #[serde(flatten)]
    pub body: LessonBody,
}

/// Body of `update_lesson`. Only changed fields are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LessonUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    // A None body flattens to nothing, so unchanged content is omitted.
    #[serde(flatten)]
    pub body: Option<LessonBody>,
}

impl LessonUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none()
    }
}

/// One quiz question as transmitted inside a quiz lesson body.
///
/// Questions have no wire-level ids; the remote system keys them by their
/// position in the transmitted list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionPayload {
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    /// One of "A", "B", "C", "D".
    pub correct_answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}
