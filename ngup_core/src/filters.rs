use crate::tokens::FilterInvocation;
use crate::tokens::Token;

/// Scan a token stream for filter invocations (`expr | name:arg:arg`).
///
/// This is a best-effort scanner rather than an expression parser. A `|` only
/// starts a filter when the token consumed just before it is an identifier, a
/// constant, or one of `]`, `)`, `"`, `'`. Each argument must be a single
/// identifier or constant token; a segment that breaks either rule is dropped
/// without affecting the rest of the scan.
pub fn parse_filters(tokens: &[Token]) -> Vec<FilterInvocation> {
	FilterScanner::new(tokens).scan()
}

struct FilterScanner<'a> {
	tokens: &'a [Token],
	cursor: usize,
	/// The last token consumed outside of a filter segment.
	left: Option<&'a Token>,
	filters: Vec<FilterInvocation>,
}

impl<'a> FilterScanner<'a> {
	fn new(tokens: &'a [Token]) -> Self {
		Self {
			tokens,
			cursor: 0,
			left: None,
			filters: vec![],
		}
	}

	fn scan(mut self) -> Vec<FilterInvocation> {
		while self.cursor < self.tokens.len() {
			while self.expect("|") {
				if self.left.is_some_and(accepts_pipe_after) {
					self.read_invocation();
				}
			}

			self.left = self.tokens.get(self.cursor);
			self.cursor += 1;
		}

		self.filters
	}

	/// Consume the next token if it is the given punctuation or operator.
	fn expect(&mut self, text: &str) -> bool {
		match self.tokens.get(self.cursor) {
			Some(token) if token.is(text) => {
				self.cursor += 1;
				true
			}
			_ => false,
		}
	}

	/// Consume the next token if it can stand as a filter name or argument.
	fn operand(&mut self) -> Option<&'a Token> {
		let token = self
			.tokens
			.get(self.cursor)
			.filter(|token| token.is_identifier() || token.is_constant())?;
		self.cursor += 1;
		Some(token)
	}

	fn read_invocation(&mut self) {
		let Some(name) = self.operand() else {
			return;
		};

		let mut tokens = vec![name.clone()];
		while self.expect(":") {
			let Some(argument) = self.operand() else {
				tracing::debug!(filter = %name.text, "dropping filter with a missing argument");
				return;
			};
			tokens.push(argument.clone());
		}

		self.filters.push(FilterInvocation { tokens });
	}
}

fn accepts_pipe_after(token: &Token) -> bool {
	token.is_identifier() || token.is_constant() || matches!(token.text.as_str(), "]" | ")" | "\"" | "'")
}
