//! Pre-save validation.
//!
//! A single pure function walks the draft tree on demand and returns a
//! structured report. The save orchestrator calls it once per save attempt;
//! nothing revalidates reactively on every keystroke. Any violation blocks
//! the whole save, so an invalid tree is never partially submitted.

use std::fmt;

use serde::Serialize;

use crate::model::{LessonContent, Section};

/// Address of a node in the draft tree, by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodePath {
    Section(usize),
    Lesson(usize, usize),
    Question(usize, usize, usize),
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodePath::Section(s) => write!(f, "section[{s}]"),
            NodePath::Lesson(s, l) => write!(f, "section[{s}].lesson[{l}]"),
            NodePath::Question(s, l, q) => {
                write!(f, "section[{s}].lesson[{l}].question[{q}]")
            }
        }
    }
}

/// One field that failed a rule.
///
/// Reports are produced locally and only ever serialized outward to the UI,
/// so the static rule strings stay borrowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub path: NodePath,
    pub field: &'static str,
    pub rule: &'static str,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}: {}", self.path, self.field, self.rule)
    }
}

/// All violations found in one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    fn push(&mut self, path: NodePath, field: &'static str, rule: &'static str) {
        self.violations.push(Violation { path, field, rule });
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.violations.is_empty() {
            return write!(f, "no violations");
        }
        let rendered: Vec<String> = self.violations.iter().map(|v| v.to_string()).collect();
        write!(f, "{}", rendered.join("; "))
    }
}

const REQUIRED: &str = "must not be empty";
const MIN_ONE_LESSON: &str = "section needs at least one lesson";
const MIN_ONE_QUESTION: &str = "quiz needs at least one question";

/// Validate the whole draft tree.
pub fn validate_course(sections: &[Section]) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (s, section) in sections.iter().enumerate() {
        let path = NodePath::Section(s);
        if section.title.trim().is_empty() {
            report.push(path, "title", REQUIRED);
        }
        if section.description.trim().is_empty() {
            report.push(path, "description", REQUIRED);
        }
        if section.lessons.is_empty() {
            report.push(path, "lessons", MIN_ONE_LESSON);
        }

        for (l, lesson) in section.lessons.iter().enumerate() {
            let path = NodePath::Lesson(s, l);
            if lesson.title.trim().is_empty() {
                report.push(path, "title", REQUIRED);
            }
            if let LessonContent::Quiz(quiz) = &lesson.content {
                if quiz.questions.is_empty() {
                    report.push(path, "questions", MIN_ONE_QUESTION);
                }
                for (q, question) in quiz.questions.iter().enumerate() {
                    let path = NodePath::Question(s, l, q);
                    if question.question_text.trim().is_empty() {
                        report.push(path, "question_text", REQUIRED);
                    }
                    for (i, option) in question.options.iter().enumerate() {
                        if option.trim().is_empty() {
                            let field = ["option_a", "option_b", "option_c", "option_d"][i];
                            report.push(path, field, REQUIRED);
                        }
                    }
                }
            }
        }
    }

    report
}
