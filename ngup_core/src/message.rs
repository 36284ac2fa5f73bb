use serde::Serialize;

use crate::LineCharacter;
use crate::LineIndex;

/// Severity of a message. `Error` sorts before `Info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Level {
	/// The construct cannot be migrated automatically; its text is left as
	/// it was.
	Error,
	/// The construct was rewritten; the message explains the rewrite.
	Info,
}

impl std::fmt::Display for Level {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Error => write!(f, "error"),
			Self::Info => write!(f, "info"),
		}
	}
}

/// A message anchored at a byte offset of the ORIGINAL template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
	pub position: usize,
	pub length: usize,
	pub level: Level,
	pub text: String,
	pub url: Option<String>,
}

impl Message {
	pub fn info(position: usize, length: usize, text: impl Into<String>) -> Self {
		Self {
			position,
			length,
			level: Level::Info,
			text: text.into(),
			url: None,
		}
	}

	pub fn error(position: usize, length: usize, text: impl Into<String>) -> Self {
		Self {
			position,
			length,
			level: Level::Error,
			text: text.into(),
			url: None,
		}
	}

	#[must_use]
	pub fn with_url(mut self, url: impl Into<String>) -> Self {
		self.url = Some(url.into());
		self
	}

	pub fn is_error(&self) -> bool {
		self.level == Level::Error
	}

	/// Resolve the byte offset into a line and character for display.
	pub fn to_diagnostic(&self, index: &LineIndex<'_>) -> Diagnostic {
		Diagnostic {
			message: self.text.clone(),
			position: index.position(self.position),
			length: self.length,
			level: self.level,
			url: self.url.clone(),
		}
	}
}

/// True when any of the messages blocks its occurrence.
pub fn has_error(messages: &[Message]) -> bool {
	messages.iter().any(Message::is_error)
}

/// A message resolved for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
	pub message: String,
	pub position: LineCharacter,
	pub length: usize,
	pub level: Level,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub url: Option<String>,
}
