use std::sync::LazyLock;

use regex::Regex;

use crate::Attribute;
use crate::Diagnostic;
use crate::Element;
use crate::Level;
use crate::LineIndex;
use crate::Message;
use crate::Node;
use crate::NgupResult;
use crate::PatchBuffer;
use crate::RuleSet;
use crate::TextNode;
use crate::filters::parse_filters;
use crate::has_error;
use crate::lexer::tokenize;
use crate::markup::parse_fragment;
use crate::rules::Edit;

/// The attribute that needs a sibling `name` attribute inside Angular forms.
const MODEL_ATTRIBUTE: &str = "ng-model";
const NG_MODEL_URL: &str = "https://angular.io/api/forms/NgModel";

/// End tags of void elements, which a rewrite can leave stranded.
static STRAY_VOID_END_TAG: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?i)</(?:base|meta|area|embed|link|img|input|param|hr|br|source|track|wbr)>")
		.expect("void end tag pattern is valid")
});

/// The outcome of rewriting one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteResult {
	pub rewritten_text: String,
	pub original_text: String,
	/// Errors first, then infos; visit order within each level.
	pub diagnostics: Vec<Diagnostic>,
}

impl RewriteResult {
	pub fn has_errors(&self) -> bool {
		self.diagnostics
			.iter()
			.any(|diagnostic| diagnostic.level == Level::Error)
	}

	pub fn has_changes(&self) -> bool {
		self.rewritten_text != self.original_text
	}

	/// Nothing was rewritten and nothing was reported.
	pub fn is_unchanged(&self) -> bool {
		!self.has_changes() && self.diagnostics.is_empty()
	}
}

/// A rewrite session bound to one rule set.
///
/// The most recent result is kept; rewriting the same text again returns it
/// without recomputing anything.
///
/// ```rust
/// use ngup_core::RuleSet;
/// use ngup_core::TemplateUpdater;
///
/// let mut updater = TemplateUpdater::new(RuleSet::default());
/// let result = updater.rewrite(r#"<div ng-if="ready"></div>"#).unwrap();
/// assert_eq!(result.rewritten_text, r#"<div *ngIf="ready"></div>"#);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TemplateUpdater {
	rules: RuleSet,
	last: Option<RewriteResult>,
}

impl TemplateUpdater {
	pub fn new(rules: RuleSet) -> Self {
		Self { rules, last: None }
	}

	pub fn rules(&self) -> &RuleSet {
		&self.rules
	}

	/// Scan `source` with the built-in markup scanner and rewrite it.
	pub fn rewrite(&mut self, source: &str) -> NgupResult<&RewriteResult> {
		let result = match self.last.take() {
			Some(result) if result.original_text == source => {
				tracing::debug!(bytes = source.len(), "reusing result for identical input");
				result
			}
			_ => {
				let nodes = parse_fragment(source);
				Rewriter::new(&self.rules, source).run(&nodes)?
			}
		};

		Ok(self.last.insert(result))
	}

	/// Rewrite `source` using a tree produced elsewhere. Every span in
	/// `nodes` must address `source`.
	pub fn rewrite_nodes(&mut self, source: &str, nodes: &[Node]) -> NgupResult<&RewriteResult> {
		self.last = None;
		let result = Rewriter::new(&self.rules, source).run(nodes)?;
		Ok(self.last.insert(result))
	}
}

/// Removes end tags of void elements from rendered markup.
pub fn strip_void_end_tags(text: &str) -> String {
	STRAY_VOID_END_TAG.replace_all(text, "").into_owned()
}

/// State for a single rewrite: the patch buffer and the messages collected
/// so far.
struct Rewriter<'a> {
	rules: &'a RuleSet,
	source: &'a str,
	buffer: PatchBuffer,
	messages: Vec<Message>,
}

impl<'a> Rewriter<'a> {
	fn new(rules: &'a RuleSet, source: &'a str) -> Self {
		Self {
			rules,
			source,
			buffer: PatchBuffer::new(source),
			messages: vec![],
		}
	}

	fn run(mut self, nodes: &[Node]) -> NgupResult<RewriteResult> {
		self.visit_nodes(nodes)?;

		let rewritten_text = strip_void_end_tags(&self.buffer.render());
		self.messages.sort_by_key(|message| message.level);

		let index = LineIndex::new(self.source);
		let diagnostics = self
			.messages
			.iter()
			.map(|message| message.to_diagnostic(&index))
			.collect::<Vec<_>>();
		tracing::debug!(diagnostics = diagnostics.len(), "rewrite finished");

		Ok(RewriteResult {
			rewritten_text,
			original_text: self.source.to_string(),
			diagnostics,
		})
	}

	fn visit_nodes(&mut self, nodes: &[Node]) -> NgupResult<()> {
		for node in nodes {
			match node {
				Node::Element(element) => {
					self.visit_nodes(&element.children)?;
					self.visit_element(element)?;
				}
				Node::Text(text) => self.visit_text(text)?,
			}
		}

		Ok(())
	}

	fn visit_element(&mut self, element: &Element) -> NgupResult<()> {
		for attribute in &element.attributes {
			self.visit_attribute(attribute)?;
		}

		self.add_model_name(element)
	}

	fn visit_attribute(&mut self, attribute: &Attribute) -> NgupResult<()> {
		let rules = self.rules;
		let mut messages = vec![];

		if rules.is_unsupported_attribute(&attribute.name) {
			tracing::debug!(attribute = %attribute.name, "unsupported attribute");
			messages.push(Message::error(
				attribute.span.start,
				attribute.name.len(),
				format!("Unsupported property {}", attribute.name),
			));
			self.messages.extend(messages);
			return Ok(());
		}

		if attribute.has_value() {
			let start = attribute.value_start();
			let mut value_changed = false;

			if let Some(transform) = rules.value_transform(&attribute.name) {
				let rewrite = transform.apply(&attribute.value, start, rules);
				value_changed = !has_error(&rewrite.messages) && rewrite.value != attribute.value;
				if value_changed {
					self.replace(start, attribute.value.len(), &rewrite.value)?;
				}
				messages.extend(rewrite.messages);
			}

			if !value_changed && !has_error(&messages) {
				let rewrite = rules.rewrite_expression(&attribute.value, start);
				self.apply_edits(start, &rewrite.edits, &[])?;
				messages.extend(rewrite.messages);
			}
		}

		if has_error(&messages) {
			tracing::debug!(attribute = %attribute.name, "value errors block the rename");
		} else if let Some(rule) = rules.rename_for(&attribute.name) {
			self.replace(attribute.span.start, attribute.name.len(), &rule.new_name)?;
			messages.push(Message {
				url: rule.url.clone(),
				..Message::info(
					attribute.span.start,
					attribute.name.len(),
					format!("Update property {} to {}", attribute.name, rule.new_name),
				)
			});
		}

		self.messages.extend(messages);
		Ok(())
	}

	fn visit_text(&mut self, text: &TextNode) -> NgupResult<()> {
		if text.content.trim().is_empty() {
			return Ok(());
		}

		let tokenized = tokenize(&text.content);
		if let Some(error) = &tokenized.error {
			tracing::debug!(%error, offset = text.start, "tokenizer stopped early");
		}

		let mut replaced = vec![];
		for invocation in parse_filters(&tokenized.tokens) {
			let start = text.start + invocation.start();
			let length = invocation.end() - invocation.start();
			let rewrite = self.rules.rewrite_filter(&invocation, start, length);
			if let Some(replacement) = &rewrite.replacement {
				self.replace(start, length, replacement)?;
				replaced.push((start, start + length));
			}
			self.messages.extend(rewrite.messages);
		}

		let rewrite = self.rules.rewrite_expression(&text.content, text.start);
		self.apply_edits(text.start, &rewrite.edits, &replaced)?;
		self.messages.extend(rewrite.messages);

		Ok(())
	}

	/// Angular forms require a `name` next to every `[(ngModel)]`. Use the
	/// element's `id` when there is one.
	fn add_model_name(&mut self, element: &Element) -> NgupResult<()> {
		let Some(model) = element.attribute(MODEL_ATTRIBUTE) else {
			return Ok(());
		};
		if element.attribute("name").is_some() {
			return Ok(());
		}

		let name = element.attribute("id").map_or_else(
			|| format!("modelName{}", element.start),
			|id| id.value.clone(),
		);
		let attribute = format!("name=\"{name}\"");
		self.buffer
			.insert_right(element.tag_name_end(), &format!(" {attribute}"))?;
		self.messages.push(
			Message::info(
				model.span.start,
				model.name.len(),
				format!("Add property {attribute} to use `[(ngModel)]` inside a form"),
			)
			.with_url(NG_MODEL_URL),
		);

		Ok(())
	}

	fn replace(&mut self, offset: usize, length: usize, text: &str) -> NgupResult<()> {
		self.buffer.remove(offset, length)?;
		if !text.is_empty() {
			self.buffer.insert_left(offset, text)?;
		}

		Ok(())
	}

	/// Apply expression edits relative to `base`, skipping any that overlap a
	/// range already replaced wholesale.
	fn apply_edits(&mut self, base: usize, edits: &[Edit], replaced: &[(usize, usize)]) -> NgupResult<()> {
		for edit in edits {
			let start = base + edit.offset;
			let end = start + edit.length;
			if replaced.iter().any(|(from, to)| start < *to && *from < end) {
				tracing::debug!(offset = start, "edit overlaps a rewritten pipe");
				continue;
			}
			self.replace(start, edit.length, &edit.replacement)?;
		}

		Ok(())
	}
}
