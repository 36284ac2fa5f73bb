use logos::Logos;
use thiserror::Error;

use crate::tokens::Literal;
use crate::tokens::Token;
use crate::tokens::TokenKind;

/// Raw tokens produced by logos for a flat pass over an expression.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\x0B\u{A0}]+")]
enum RawToken {
	#[regex(r#""([^"\\]|\\[\s\S])*""#)]
	#[regex(r"'([^'\\]|\\[\s\S])*'")]
	QuotedString,
	#[regex(r#""([^"\\]|\\[\s\S])*\\?"#)]
	#[regex(r"'([^'\\]|\\[\s\S])*\\?")]
	UnterminatedString,
	#[regex(r"([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?")]
	Number,
	/// A number whose signed exponent has no digits, e.g. `1e+`. A bare `1e`
	/// lexes as a number followed by an identifier.
	#[regex(r"([0-9]+(\.[0-9]*)?|\.[0-9]+)[eE][+-]")]
	DanglingExponent,
	#[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*")]
	Ident,
	#[regex(r"[(){}\[\].,;:?]")]
	Punctuation,
	#[token("===")]
	#[token("!==")]
	#[token("==")]
	#[token("!=")]
	#[token("<=")]
	#[token(">=")]
	#[token("&&")]
	#[token("||")]
	#[token("!")]
	#[token("=")]
	#[token("|")]
	#[token("+")]
	#[token("-")]
	#[token("*")]
	#[token("/")]
	#[token("%")]
	#[token("<")]
	#[token(">")]
	Operator,
}

/// A lexical failure. Tokenization stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum LexError {
	#[error("unterminated quote at column {offset}")]
	UnterminatedQuote { offset: usize },
	#[error("invalid unicode escape [\\u{escape}] at column {offset}")]
	InvalidUnicodeEscape { offset: usize, escape: String },
	#[error("invalid exponent at column {offset}")]
	InvalidExponent { offset: usize },
	#[error("unexpected next character `{character}` at column {offset}")]
	UnexpectedCharacter { offset: usize, character: char },
}

impl LexError {
	/// Byte offset (relative to the tokenized text) where lexing stopped.
	pub fn offset(&self) -> usize {
		match self {
			Self::UnterminatedQuote { offset }
			| Self::InvalidUnicodeEscape { offset, .. }
			| Self::InvalidExponent { offset }
			| Self::UnexpectedCharacter { offset, .. } => *offset,
		}
	}
}

/// The outcome of a tokenization run: every token read before the first
/// lexical failure, and the failure itself if there was one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tokenized {
	pub tokens: Vec<Token>,
	pub error: Option<LexError>,
}

impl Tokenized {
	pub fn is_complete(&self) -> bool {
		self.error.is_none()
	}
}

/// Tokenize an expression in a single left-to-right pass.
///
/// Whitespace (space, `\r`, `\t`, `\n`, `\v` and NBSP) is skipped. On the
/// first lexical failure the partial token list is returned together with
/// the error.
pub fn tokenize(source: &str) -> Tokenized {
	let mut tokens = Vec::new();

	for (result, span) in RawToken::lexer(source).spanned() {
		let slice = &source[span.clone()];
		let offset = span.start;

		let Ok(raw) = result else {
			let character = slice.chars().next().unwrap_or_default();
			return Tokenized {
				tokens,
				error: Some(LexError::UnexpectedCharacter { offset, character }),
			};
		};

		let token = match raw {
			RawToken::QuotedString => {
				match unescape(&slice[1..slice.len() - 1], offset + 1) {
					Ok(value) => Token::constant(offset, slice, Literal::String(value)),
					Err(error) => {
						return Tokenized {
							tokens,
							error: Some(error),
						};
					}
				}
			}
			RawToken::UnterminatedString => {
				return Tokenized {
					tokens,
					error: Some(LexError::UnterminatedQuote { offset }),
				};
			}
			RawToken::Number => {
				let value = slice.parse::<f64>().unwrap_or(f64::NAN);
				Token::constant(offset, slice, Literal::Number(value))
			}
			RawToken::DanglingExponent => {
				return Tokenized {
					tokens,
					error: Some(LexError::InvalidExponent { offset }),
				};
			}
			RawToken::Ident => Token::new(offset, slice, TokenKind::Identifier),
			RawToken::Punctuation => Token::new(offset, slice, TokenKind::Punctuation),
			RawToken::Operator => Token::new(offset, slice, TokenKind::Operator),
		};

		tokens.push(token);
	}

	Tokenized {
		tokens,
		error: None,
	}
}

/// Decode the escapes of a string literal body. `start` is the offset of the
/// body within the tokenized text and is only used for error reporting.
fn unescape(body: &str, start: usize) -> Result<String, LexError> {
	let mut value = String::with_capacity(body.len());
	let mut chars = body.char_indices();
	let mut pending_high: Option<u32> = None;

	while let Some((index, ch)) = chars.next() {
		if ch != '\\' {
			flush_surrogate(&mut value, &mut pending_high);
			value.push(ch);
			continue;
		}

		let Some((_, escaped)) = chars.next() else {
			break;
		};

		if escaped != 'u' {
			flush_surrogate(&mut value, &mut pending_high);
			value.push(match escaped {
				'n' => '\n',
				'f' => '\u{0C}',
				'r' => '\r',
				't' => '\t',
				'v' => '\u{0B}',
				other => other,
			});
			continue;
		}

		let hex_start = index + 2;
		let hex: String = body[hex_start..].chars().take(4).collect();
		let code = (hex.len() == 4 && hex.chars().all(|c| c.is_ascii_hexdigit()))
			.then(|| u32::from_str_radix(&hex, 16).ok())
			.flatten()
			.ok_or_else(|| {
				LexError::InvalidUnicodeEscape {
					offset: start + index,
					escape: hex.clone(),
				}
			})?;

		for _ in 0..4 {
			chars.next();
		}

		match code {
			0xD800..=0xDBFF => {
				flush_surrogate(&mut value, &mut pending_high);
				pending_high = Some(code);
			}
			0xDC00..=0xDFFF => {
				let combined = pending_high
					.take()
					.map(|high| 0x10000 + ((high - 0xD800) << 10) + (code - 0xDC00));
				value.push(
					combined
						.and_then(char::from_u32)
						.unwrap_or(char::REPLACEMENT_CHARACTER),
				);
			}
			_ => {
				flush_surrogate(&mut value, &mut pending_high);
				value.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
			}
		}
	}

	flush_surrogate(&mut value, &mut pending_high);
	Ok(value)
}

/// A high surrogate that never found its low half decodes to U+FFFD.
fn flush_surrogate(value: &mut String, pending_high: &mut Option<u32>) {
	if pending_high.take().is_some() {
		value.push(char::REPLACEMENT_CHARACTER);
	}
}
