use crate::Attribute;
use crate::Diagnostic;
use crate::Element;
use crate::Level;
use crate::Node;
use crate::NgupResult;
use crate::RewriteResult;
use crate::RuleSet;
use crate::Span;
use crate::TemplateUpdater;
use crate::TextNode;
use crate::Token;
use crate::tokenize;

/// Rewrite `source` with the default catalogue.
pub fn rewrite(source: &str) -> NgupResult<RewriteResult> {
	let mut updater = TemplateUpdater::new(RuleSet::default());
	updater.rewrite(source).cloned()
}

/// The tokens of `source`, asserting that lexing completed.
pub fn tokens(source: &str) -> Vec<Token> {
	let tokenized = tokenize(source);
	assert!(
		tokenized.is_complete(),
		"unexpected lex error: {:?}",
		tokenized.error
	);
	tokenized.tokens
}

pub fn token_texts(source: &str) -> Vec<String> {
	tokens(source).into_iter().map(|token| token.text).collect()
}

pub fn messages(result: &RewriteResult) -> Vec<(Level, String)> {
	result
		.diagnostics
		.iter()
		.map(|diagnostic| (diagnostic.level, diagnostic.message.clone()))
		.collect()
}

pub fn errors(result: &RewriteResult) -> Vec<&Diagnostic> {
	result
		.diagnostics
		.iter()
		.filter(|diagnostic| diagnostic.level == Level::Error)
		.collect()
}

/// A quoted attribute whose name starts at `start`.
pub fn quoted_attribute(name: &str, value: &str, start: usize) -> Attribute {
	Attribute {
		name: name.to_string(),
		value: value.to_string(),
		span: Span::new(start, start + name.len() + value.len() + 3),
		quoted: true,
	}
}

pub fn element(tag_name: &str, start: usize, attributes: Vec<Attribute>, children: Vec<Node>) -> Node {
	Node::Element(Element {
		tag_name: tag_name.to_string(),
		start,
		attributes,
		children,
	})
}

pub fn text(content: &str, start: usize) -> Node {
	Node::Text(TextNode {
		content: content.to_string(),
		start,
	})
}
