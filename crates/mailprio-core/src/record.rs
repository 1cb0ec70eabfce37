//! Email records and the raw input submitted for classification.

use serde::{Deserialize, Serialize};

/// One labelled row of the training dataset.
///
/// Expects CSV columns `subject`, `body`, `label`. Empty or absent text cells
/// are read as empty strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmailRecord {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    /// 1 = important, 0 = not important.
    pub label: u8,
}

impl EmailRecord {
    /// Subject and body joined the same way the front-end joins them.
    pub fn text(&self) -> String {
        combine_text(&self.subject, &self.body)
    }

    pub fn is_important(&self) -> bool {
        self.label == 1
    }
}

/// Join subject and body with a single space.
///
/// Neither side is trimmed, so `combine_text("", "x")` is `" x"`.
pub fn combine_text(subject: &str, body: &str) -> String {
    let mut combined = String::with_capacity(subject.len() + body.len() + 1);
    combined.push_str(subject);
    combined.push(' ');
    combined.push_str(body);
    combined
}

/// A subject/body pair as entered by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInput {
    pub subject: String,
    pub body: String,
}

impl RawInput {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// True when both fields are empty or whitespace-only.
    pub fn is_blank(&self) -> bool {
        self.subject.trim().is_empty() && self.body.trim().is_empty()
    }

    pub fn combined(&self) -> String {
        combine_text(&self.subject, &self.body)
    }
}
