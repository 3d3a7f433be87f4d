//! Entity model for the draft tree: sections, lessons, quiz questions.
//!
//! Every entity carries an `EntityId` that is either `Draft` (locally
//! minted, never seen by the remote system) or `Persisted` (issued by the
//! remote system on create). The distinction is a tagged union rather than
//! an id-prefix convention so "is this saved yet" checks are exhaustive
//! matches instead of string inspection.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier state of a draft-tree entity.
///
/// `Draft` ids exist only in the browser-side draft; `Persisted` ids are
/// permanent for the entity's lifetime. An entity moves `Draft → Persisted`
/// exactly once, when its create call succeeds, and never back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "id", rename_all = "snake_case")]
pub enum EntityId {
    Draft(String),
    Persisted(String),
}

impl EntityId {
    /// Mint a fresh draft id.
    pub fn new_draft() -> Self {
        EntityId::Draft(Uuid::new_v4().to_string())
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, EntityId::Draft(_))
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, EntityId::Persisted(_))
    }

    /// The stable id, if the entity has been persisted.
    pub fn persisted(&self) -> Option<&str> {
        match self {
            EntityId::Persisted(id) => Some(id),
            EntityId::Draft(_) => None,
        }
    }

    /// The underlying id string regardless of state. Unique across the
    /// tree in both states, so it can key side tables like dirty marks.
    pub fn raw(&self) -> &str {
        match self {
            EntityId::Draft(id) | EntityId::Persisted(id) => id,
        }
    }
}

/// One of the four labeled answer options of a quiz question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerChoice {
    A,
    B,
    C,
    D,
}

impl AnswerChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerChoice::A => "A",
            AnswerChoice::B => "B",
            AnswerChoice::C => "C",
            AnswerChoice::D => "D",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "A" => Some(AnswerChoice::A),
            "B" => Some(AnswerChoice::B),
            "C" => Some(AnswerChoice::C),
            "D" => Some(AnswerChoice::D),
            _ => None,
        }
    }

    /// Index into a question's `options` array.
    pub fn index(&self) -> usize {
        match self {
            AnswerChoice::A => 0,
            AnswerChoice::B => 1,
            AnswerChoice::C => 2,
            AnswerChoice::D => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: EntityId,
    pub question_text: String,
    /// Options A through D, in label order.
    pub options: [String; 4],
    pub correct_answer: AnswerChoice,
    pub explanation: Option<String>,
    pub order_index: u32,
}

impl QuizQuestion {
    /// An empty question placed at `order_index`.
    pub fn blank(order_index: u32) -> Self {
        Self {
            id: EntityId::new_draft(),
            question_text: String::new(),
            options: Default::default(),
            correct_answer: AnswerChoice::A,
            explanation: None,
            order_index,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.question_text.trim().is_empty() && self.options.iter().all(|o| o.trim().is_empty())
    }
}

/// Opaque reference to attached video media.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRef {
    pub upload_id: Option<String>,
    pub url: Option<String>,
    pub duration_seconds: Option<u32>,
}

impl VideoRef {
    pub fn is_attached(&self) -> bool {
        self.upload_id.is_some() || self.url.is_some()
    }
}

/// Quiz payload of a quiz lesson. Source documents and the spreadsheet
/// import pointer are opaque references owned by external collaborators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub questions: Vec<QuizQuestion>,
    pub source_documents: Vec<String>,
    pub spreadsheet_import: Option<String>,
}

/// Lesson kind. Immutable once the lesson is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LessonKind {
    Video,
    Quiz,
}

/// Kind-specific lesson payload. The kind is the discriminant; swapping
/// the variant is exactly what "changing the lesson type" means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LessonContent {
    Video(VideoRef),
    Quiz(Quiz),
}

impl LessonContent {
    pub fn kind(&self) -> LessonKind {
        match self {
            LessonContent::Video(_) => LessonKind::Video,
            LessonContent::Quiz(_) => LessonKind::Quiz,
        }
    }

    pub fn empty(kind: LessonKind) -> Self {
        match kind {
            LessonKind::Video => LessonContent::Video(VideoRef::default()),
            LessonKind::Quiz => LessonContent::Quiz(Quiz::default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: EntityId,
    pub title: String,
    pub content: LessonContent,
    pub order_index: u32,
}

impl Lesson {
    /// A fresh draft lesson of the given kind at `order_index`.
    pub fn draft(kind: LessonKind, order_index: u32) -> Self {
        Self {
            id: EntityId::new_draft(),
            title: String::new(),
            content: LessonContent::empty(kind),
            order_index,
        }
    }

    pub fn kind(&self) -> LessonKind {
        self.content.kind()
    }

    /// Whether deleting this lesson discards anything the user typed or
    /// attached. Drives the confirm-before-delete policy.
    pub fn has_content(&self) -> bool {
        if !self.title.trim().is_empty() {
            return true;
        }
        match &self.content {
            LessonContent::Video(video) => video.is_attached(),
            LessonContent::Quiz(quiz) => quiz.questions.iter().any(|q| !q.is_blank()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    pub order_index: u32,
    /// Always at least one lesson.
    pub lessons: Vec<Lesson>,
}

impl Section {
    /// A fresh draft section at `order_index`, seeded with one draft video
    /// lesson so the minimum-one-lesson invariant holds from birth.
    pub fn draft(order_index: u32) -> Self {
        Self {
            id: EntityId::new_draft(),
            title: String::new(),
            description: String::new(),
            order_index,
            lessons: vec![Lesson::draft(LessonKind::Video, 0)],
        }
    }

    /// Whether deleting this section discards anything the user typed.
    pub fn has_content(&self) -> bool {
        !self.title.trim().is_empty()
            || !self.description.trim().is_empty()
            || self.lessons.iter().any(Lesson::has_content)
    }
}
