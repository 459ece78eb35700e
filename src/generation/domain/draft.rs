//! Validation of untrusted analyzer output.
//!
//! Analyzer output is parsed into [`RawDraftTask`] values whose fields are
//! all optional, then checked against the batch of comments it was produced
//! for. Only [`ValidatedDraft`] values ever become tasks.

use crate::review::domain::{CommentId, ReviewComment, ReviewId, ReviewUnit};
use crate::task::domain::{NewTask, Priority};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// A task candidate exactly as the analyzer produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawDraftTask {
    /// Proposed description.
    #[serde(default)]
    pub description: Option<String>,
    /// Feedback text the draft was derived from.
    #[serde(default)]
    pub origin_text: Option<String>,
    /// Priority label, mapped through [`Priority`] with a `medium` default.
    #[serde(default)]
    pub priority: Option<String>,
    /// Source comment; `0` marks a synthetic task.
    #[serde(default)]
    pub source_comment_id: Option<u64>,
    /// File the task concerns.
    #[serde(default)]
    pub file_path: Option<String>,
    /// Line the task concerns.
    #[serde(default)]
    pub line: Option<u32>,
}

/// Output that could not be read as a list of drafts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftParseError {
    /// The output is not JSON.
    #[error("analyzer output is not valid JSON: {0}")]
    InvalidJson(String),

    /// The output is JSON but not a draft list.
    #[error("analyzer output must be an array or an object with a `tasks` array")]
    UnexpectedShape,
}

/// Parsed analyzer output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDrafts {
    /// Entries that decoded as drafts.
    pub drafts: Vec<RawDraftTask>,
    /// Entries that were not draft objects.
    pub malformed: usize,
}

/// Parses analyzer output.
///
/// Surrounding Markdown code fences are ignored. Both a bare JSON array and
/// an object with a `tasks` array are accepted. Array entries that do not
/// decode as drafts are counted rather than failing the whole output.
///
/// # Errors
///
/// Returns [`DraftParseError`] when the output is not JSON or has an
/// unexpected shape.
pub fn parse_analyzer_output(raw: &str) -> Result<ParsedDrafts, DraftParseError> {
    let body = strip_code_fence(raw);
    let value: Value =
        serde_json::from_str(body).map_err(|err| DraftParseError::InvalidJson(err.to_string()))?;
    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(mut object) => match object.remove("tasks") {
            Some(Value::Array(entries)) => entries,
            _ => return Err(DraftParseError::UnexpectedShape),
        },
        _ => return Err(DraftParseError::UnexpectedShape),
    };

    let mut parsed = ParsedDrafts::default();
    for entry in entries {
        match serde_json::from_value::<RawDraftTask>(entry) {
            Ok(draft) => parsed.drafts.push(draft),
            Err(_) => parsed.malformed = parsed.malformed.saturating_add(1),
        }
    }
    Ok(parsed)
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(after_open) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let after_info = after_open
        .split_once('\n')
        .map_or("", |(_, rest)| rest);
    after_info
        .trim_end()
        .strip_suffix("```")
        .unwrap_or(after_info)
        .trim()
}

/// Why a draft was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftRejection {
    /// The draft has no usable description.
    #[error("draft has no description")]
    MissingDescription,

    /// The draft names a comment outside its batch.
    #[error("draft refers to comment {0}, which is not in the batch")]
    UnknownComment(CommentId),

    /// The batch is empty, so the draft has no review to belong to.
    #[error("draft produced for an empty batch")]
    EmptyBatch,
}

/// A draft that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDraft {
    /// Source comment, or [`CommentId::SYNTHETIC`].
    pub comment_id: CommentId,
    /// Review of the source comment.
    pub review_id: ReviewId,
    /// Trimmed description.
    pub description: String,
    /// Feedback text the task was derived from.
    pub origin_text: String,
    /// Mapped priority.
    pub priority: Priority,
    /// File the task concerns.
    pub file_path: Option<String>,
    /// Line the task concerns.
    pub line: Option<u32>,
}

impl ValidatedDraft {
    /// Checks a raw draft against the batch it was produced for.
    ///
    /// A draft without a comment reference belongs to the batch's only
    /// comment, or becomes synthetic in a larger batch. Synthetic drafts
    /// take the review of the batch's first comment. Missing location and
    /// origin text are filled in from the source comment.
    ///
    /// # Errors
    ///
    /// Returns [`DraftRejection`] when the draft cannot become a task.
    pub fn from_raw(raw: RawDraftTask, batch: &[ReviewComment]) -> Result<Self, DraftRejection> {
        let description = raw
            .description
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or(DraftRejection::MissingDescription)?
            .to_owned();
        let first = batch.first().ok_or(DraftRejection::EmptyBatch)?;

        let source = match raw.source_comment_id.map(CommentId::new) {
            Some(id) if id.is_synthetic() => None,
            Some(id) => Some(
                batch
                    .iter()
                    .find(|comment| comment.id() == id)
                    .ok_or(DraftRejection::UnknownComment(id))?,
            ),
            None if batch.len() == 1 => Some(first),
            None => None,
        };

        let priority = raw
            .priority
            .as_deref()
            .map_or_else(Priority::default, Priority::from_label_or_default);

        Ok(match source {
            Some(comment) => Self {
                comment_id: comment.id(),
                review_id: comment.review_id(),
                description,
                origin_text: raw
                    .origin_text
                    .unwrap_or_else(|| comment.body().to_owned()),
                priority,
                file_path: raw
                    .file_path
                    .or_else(|| comment.file_path().map(ToOwned::to_owned)),
                line: raw.line.or(comment.line()),
            },
            None => Self {
                comment_id: CommentId::SYNTHETIC,
                review_id: first.review_id(),
                description,
                origin_text: raw.origin_text.unwrap_or_default(),
                priority,
                file_path: raw.file_path,
                line: raw.line,
            },
        })
    }

    /// Converts the draft into task content.
    #[must_use]
    pub fn into_new_task(self, review_unit: ReviewUnit, task_index: u32) -> NewTask {
        NewTask {
            review_unit,
            source_review_id: self.review_id,
            source_comment_id: self.comment_id,
            task_index,
            description: self.description,
            origin_text: self.origin_text,
            priority: self.priority,
            file_path: self.file_path,
            line: self.line,
        }
    }
}
