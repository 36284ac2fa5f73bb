use std::fmt::Display;

use float_cmp::approx_eq;

/// The broad class of an expression token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
	/// `item`, `$index`, `_private`
	Identifier,
	/// A string or numeric literal, e.g. `'USD'` or `1.5e3`
	Constant,
	/// `===`, `|`, `+`, ...
	Operator,
	/// One of `(){}[].,;:?`
	Punctuation,
}

/// The decoded value carried by a constant token.
#[derive(Debug, Clone)]
pub enum Literal {
	/// A numeric literal, e.g. `2`, `.5`, `1e-3`.
	Number(f64),
	/// The unescaped content of a quoted string literal, without quotes.
	String(String),
}

impl Eq for Literal {}
impl PartialEq for Literal {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Literal::Number(value), Literal::Number(other_value)) => {
				approx_eq!(f64, *value, *other_value, ulps = 2)
			}
			(Literal::String(value), Literal::String(other_value)) => value == other_value,
			_ => false,
		}
	}
}

/// A single token of an expression, positioned relative to the start of the
/// text that was tokenized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
	/// Byte offset of the first character of the token.
	pub offset: usize,
	/// The raw source text of the token. String literals keep their quotes.
	pub text: String,
	pub kind: TokenKind,
	/// Present for constants only.
	pub literal: Option<Literal>,
}

impl Token {
	pub fn new(offset: usize, text: impl Into<String>, kind: TokenKind) -> Self {
		Self {
			offset,
			text: text.into(),
			kind,
			literal: None,
		}
	}

	pub fn constant(offset: usize, text: impl Into<String>, literal: Literal) -> Self {
		Self {
			offset,
			text: text.into(),
			kind: TokenKind::Constant,
			literal: Some(literal),
		}
	}

	/// Byte offset one past the last character of the token.
	pub fn end(&self) -> usize {
		self.offset + self.text.len()
	}

	pub fn is_identifier(&self) -> bool {
		self.kind == TokenKind::Identifier
	}

	pub fn is_constant(&self) -> bool {
		self.kind == TokenKind::Constant
	}

	/// True when the token is the given punctuation or operator text.
	pub fn is(&self, text: &str) -> bool {
		matches!(self.kind, TokenKind::Operator | TokenKind::Punctuation) && self.text == text
	}

	pub fn number_value(&self) -> Option<f64> {
		match &self.literal {
			Some(Literal::Number(value)) => Some(*value),
			_ => None,
		}
	}

	pub fn string_value(&self) -> Option<&str> {
		match &self.literal {
			Some(Literal::String(value)) => Some(value),
			_ => None,
		}
	}
}

impl Display for Token {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.text)
	}
}

/// One pipe segment of a filter chain: the filter name followed by its
/// `:`-separated single-token arguments.
///
/// For `value | currency:'EUR':2` the invocation holds the tokens
/// `currency`, `'EUR'` and `2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterInvocation {
	pub tokens: Vec<Token>,
}

impl FilterInvocation {
	/// The filter name. Invocations are never empty.
	pub fn name(&self) -> &str {
		&self.tokens[0].text
	}

	pub fn args(&self) -> &[Token] {
		&self.tokens[1..]
	}

	/// Byte offset of the filter name.
	pub fn start(&self) -> usize {
		self.tokens[0].offset
	}

	/// Byte offset one past the last argument.
	pub fn end(&self) -> usize {
		self.tokens.last().map_or(self.start(), Token::end)
	}

	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}

	/// The chain as written, normalised to `name:arg:arg` without whitespace.
	pub fn chain_text(&self) -> String {
		self.tokens
			.iter()
			.map(|token| token.text.as_str())
			.collect::<Vec<_>>()
			.join(":")
	}
}

impl Display for FilterInvocation {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.chain_text())
	}
}
