//! Declarative migration rules and the pure functions that apply them.
//!
//! A [`RuleSet`] is plain data: lookup tables keyed by attribute or filter
//! name whose values are closed transform enums. Applying a rule never
//! touches the patch buffer; it returns the replacement text and the
//! messages describing it, and the caller decides whether to record the edit.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::FilterInvocation;
use crate::Message;
use crate::NgupError;
use crate::NgupResult;
use crate::config::RulesConfig;
use crate::currencies::is_currency_code;
use crate::filters::parse_filters;
use crate::has_error;
use crate::lexer::tokenize;

const QUICK_REFERENCE_URL: &str = "https://angular.io/guide/ajs-quick-reference";
const TEMPLATE_SYNTAX_URL: &str = "https://angular.io/guide/template-syntax";
const USER_INPUT_URL: &str = "https://angular.io/guide/user-input";
const NG_MODEL_URL: &str = "https://angular.io/api/forms/NgModel#properties";
const NG_FOR_URL: &str = "https://angular.io/api/common/NgForOf";
const NG_FOR_TRACK_BY_URL: &str = "https://angular.io/api/common/NgForOf#ngForTrackBy";
const SLICE_PIPE_URL: &str = "https://angular.io/api/common/SlicePipe";
const CURRENCY_PIPE_URL: &str = "https://angular.io/api/common/CurrencyPipe";

/// `(old name, new name, reference url)` for the default attribute renames.
const DEFAULT_RENAMES: &[(&str, &str, &str)] = &[
	("ng-model", "[(ngModel)]", NG_MODEL_URL),
	("ng-change", "(ngModelChange)", NG_MODEL_URL),
	(
		"ng-submit",
		"(ngSubmit)",
		"https://angular.io/api/forms/NgModel#using-ngmodel-within-a-form",
	),
	("ng-disabled", "[disabled]", NG_MODEL_URL),
	("ng-class", "[ngClass]", "https://angular.io/api/common/NgClass"),
	("ng-style", "[ngStyle]", "https://angular.io/api/common/NgStyle"),
	("ng-bind-html", "[innerHTML]", TEMPLATE_SYNTAX_URL),
	("ng-href", "href", TEMPLATE_SYNTAX_URL),
	("ng-src", "src", TEMPLATE_SYNTAX_URL),
	("ng-srcset", "srcset", TEMPLATE_SYNTAX_URL),
	("ng-show", "[hidden]", TEMPLATE_SYNTAX_URL),
	("ng-if", "*ngIf", "https://angular.io/api/common/NgIf"),
	("ng-repeat", "*ngFor", NG_FOR_URL),
	("ng-keydown", "(keydown)", USER_INPUT_URL),
	("ng-keypress", "(keypress)", USER_INPUT_URL),
	("ng-keyup", "(keyup)", USER_INPUT_URL),
	("ng-click", "(click)", USER_INPUT_URL),
	("ng-dblclick", "(dblclick)", USER_INPUT_URL),
	("ng-mousedown", "(mousedown)", USER_INPUT_URL),
	("ng-mouseup", "(mouseup)", USER_INPUT_URL),
	("ng-mouseenter", "(mouseenter)", USER_INPUT_URL),
	("ng-mouseleave", "(mouseleave)", USER_INPUT_URL),
	("ng-mousemove", "(mousemove)", USER_INPUT_URL),
	("ng-mouseover", "(mouseover)", USER_INPUT_URL),
	("ng-focus", "(focus)", USER_INPUT_URL),
	("ng-blur", "(blur)", USER_INPUT_URL),
	("ng-cut", "(cut)", USER_INPUT_URL),
	("ng-copy", "(copy)", USER_INPUT_URL),
	("ng-paste", "(paste)", USER_INPUT_URL),
	("ng-switch", "[ngSwitch]", "https://angular.io/api/common/NgSwitch"),
	(
		"ng-switch-when",
		"*ngSwitchCase",
		"https://angular.io/api/common/NgSwitchCase",
	),
	(
		"ng-switch-default",
		"*ngSwitchDefault",
		"https://angular.io/api/common/NgSwitchDefault",
	),
];

const DEFAULT_UNSUPPORTED_ATTRIBUTES: &[&str] = &[
	"ng-app",
	"ng-controller",
	"ng-init",
	"ng-include",
	"ng-transclude",
];

/// Angular ships no equivalent for these filters.
const DEFAULT_UNSUPPORTED_PIPES: &[&str] = &["filter", "orderBy"];

static REPEAT_EXPRESSION: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"^\s*([\s\S]+?)\s+in\s+([\s\S]+?)(?:\s+as\s+([\s\S]+?))?(?:\s+track\s+by\s+([\s\S]+?))?\s*$",
	)
	.expect("repeat expression pattern is valid")
});

static REPEAT_ITEM: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^(?:(\s*[$\w]+)|\(\s*([$\w]+)\s*,\s*([$\w]+)\s*\))$")
		.expect("repeat item pattern is valid")
});

static ALIAS_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[$a-zA-Z_][$a-zA-Z0-9_]*$").expect("alias identifier pattern is valid")
});

static RESERVED_ALIAS: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^(null|undefined|this|\$index|\$first|\$middle|\$last|\$even|\$odd|\$parent|\$root|\$id)$")
		.expect("reserved alias pattern is valid")
});

/// Renames an attribute, leaving its value alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRenameRule {
	pub old_name: String,
	pub new_name: String,
	pub url: Option<String>,
}

impl AttributeRenameRule {
	pub fn new(old_name: impl Into<String>, new_name: impl Into<String>) -> Self {
		Self {
			old_name: old_name.into(),
			new_name: new_name.into(),
			url: None,
		}
	}

	#[must_use]
	pub fn with_url(mut self, url: impl Into<String>) -> Self {
		self.url = Some(url.into());
		self
	}
}

/// A rewritten attribute value and the messages describing the rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueRewrite {
	pub value: String,
	pub messages: Vec<Message>,
}

impl ValueRewrite {
	fn unchanged(value: &str, messages: Vec<Message>) -> Self {
		Self {
			value: value.to_string(),
			messages,
		}
	}
}

/// Whole-value rewrites keyed by attribute name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ValueTransform {
	/// `ng-show="expr"` becomes `[hidden]="!(expr)"`.
	HiddenNegation,
	/// `ng-repeat="item in items | filter"` becomes
	/// `*ngFor="let item of items | pipe"`.
	RepeatToFor,
}

impl ValueTransform {
	pub fn from_name(name: &str) -> NgupResult<Self> {
		match name {
			"hidden-negation" => Ok(Self::HiddenNegation),
			"repeat-to-for" => Ok(Self::RepeatToFor),
			_ => Err(NgupError::UnknownValueTransform(name.to_string())),
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			Self::HiddenNegation => "hidden-negation",
			Self::RepeatToFor => "repeat-to-for",
		}
	}

	/// Rewrite `value`, whose first byte sits at `start` in the original
	/// template. Filter chains inside the value are rewritten through the
	/// pipe rules of `rules`.
	pub fn apply(self, value: &str, start: usize, rules: &RuleSet) -> ValueRewrite {
		match self {
			Self::HiddenNegation => {
				ValueRewrite {
					value: format!("!({value})"),
					messages: vec![
						Message::info(
							start,
							value.len(),
							"Update expression `ng-show=\"expression\"` to \
							 `[hidden]=\"!(expression)\"`",
						)
						.with_url(QUICK_REFERENCE_URL),
					],
				}
			}
			Self::RepeatToFor => repeat_to_for(value, start, rules),
		}
	}
}

fn repeat_to_for(expression: &str, start: usize, rules: &RuleSet) -> ValueRewrite {
	let length = expression.len();
	let unexpected = || Message::error(start, length, "Unexpected expression");

	let Some(captures) = REPEAT_EXPRESSION.captures(expression) else {
		return ValueRewrite::unchanged(expression, vec![unexpected()]);
	};
	let item = captures.get(1).map_or("", |m| m.as_str());
	let collection = captures.get(2).map_or("", |m| m.as_str());
	let alias = captures.get(3).map(|m| m.as_str());
	let track_by = captures.get(4);

	let Some(item_captures) = REPEAT_ITEM.captures(item) else {
		return ValueRewrite::unchanged(expression, vec![unexpected()]);
	};
	let value_identifier = item_captures
		.get(3)
		.or_else(|| item_captures.get(1))
		.map_or("", |m| m.as_str().trim());
	let key_identifier = item_captures.get(2);

	let mut messages = vec![];
	if alias.is_some_and(|alias| !ALIAS_IDENTIFIER.is_match(alias) || RESERVED_ALIAS.is_match(alias)) {
		messages.push(unexpected());
	}
	if track_by.is_some() {
		messages.push(
			Message::error(
				start,
				length,
				"Unsupported expression `track by` use `trackBy` instead",
			)
			.with_url(NG_FOR_TRACK_BY_URL),
		);
	}
	if key_identifier.is_some() {
		messages.push(
			Message::error(start, length, "Unsupported expression `(key, value) in items`")
				.with_url(NG_FOR_URL),
		);
	}
	if alias.is_some() {
		messages.push(
			Message::error(start, length, "Unsupported expression `item in items as named`")
				.with_url(NG_FOR_URL),
		);
	}

	let collection = rules.rewrite_filter_chain(collection, start, length);
	messages.extend(collection.messages);

	if has_error(&messages) {
		return ValueRewrite::unchanged(expression, messages);
	}

	messages.insert(
		0,
		Message::info(
			start,
			length,
			"Update expression `item in items` to `let item of items`",
		)
		.with_url(NG_FOR_URL),
	);

	ValueRewrite {
		value: format!("let {value_identifier} of {}", collection.value),
		messages,
	}
}

/// The replacement for a whole `name:arg:arg` chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipeRewrite {
	pub value: String,
	pub url: &'static str,
}

/// Filter-to-pipe rewrites keyed by filter name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PipeTransform {
	/// `limitTo:limit:begin` becomes `slice:begin:limit`.
	LimitToSlice,
	/// `currency:symbol:fractionSize` becomes
	/// `currency:'USD':symbol` or `currency:'USD':'symbol':fractionSize`.
	Currency,
}

impl PipeTransform {
	pub fn from_name(name: &str) -> NgupResult<Self> {
		match name {
			"limit-to-slice" => Ok(Self::LimitToSlice),
			"currency" => Ok(Self::Currency),
			_ => Err(NgupError::UnknownPipeTransform(name.to_string())),
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			Self::LimitToSlice => "limit-to-slice",
			Self::Currency => "currency",
		}
	}

	pub fn apply(self, invocation: &FilterInvocation) -> PipeRewrite {
		let tokens = &invocation.tokens;
		match self {
			Self::LimitToSlice => {
				let value = if tokens.len() <= 2 {
					"slice:0".to_string()
				} else {
					format!("slice:{}:{}", tokens[2].text, tokens[1].text)
				};
				PipeRewrite {
					value,
					url: SLICE_PIPE_URL,
				}
			}
			Self::Currency => {
				let original = invocation.chain_text();
				let value = match tokens.len() {
					2 => {
						let symbol = &tokens[1];
						let code = symbol.string_value().unwrap_or(&symbol.text);
						if is_currency_code(code) {
							original
						} else {
							format!("currency:'USD':{}", symbol.text)
						}
					}
					3 => {
						fraction_digits(&tokens[2]).map_or(original, |digits| {
							format!("currency:'USD':'symbol':{digits}")
						})
					}
					_ => original,
				};
				PipeRewrite {
					value,
					url: CURRENCY_PIPE_URL,
				}
			}
		}
	}
}

/// A fraction digit count written as a number or a numeric string.
fn fraction_digits(token: &crate::Token) -> Option<u32> {
	if let Some(number) = token.number_value() {
		return (number.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&number))
			.then_some(number as u32);
	}

	token.string_value()?.trim().parse().ok()
}

/// A single replacement inside an expression, relative to its start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
	pub offset: usize,
	pub length: usize,
	pub replacement: String,
}

/// Localised edits to an expression plus the messages describing them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpressionRewrite {
	/// Non-overlapping, in ascending offset order.
	pub edits: Vec<Edit>,
	pub messages: Vec<Message>,
}

impl ExpressionRewrite {
	/// Apply the edits to `expression`.
	pub fn apply_to(&self, expression: &str) -> String {
		let mut output = String::with_capacity(expression.len());
		let mut cursor = 0;
		for edit in &self.edits {
			output.push_str(&expression[cursor..edit.offset]);
			output.push_str(&edit.replacement);
			cursor = edit.offset + edit.length;
		}
		output.push_str(&expression[cursor..]);
		output
	}

	pub fn changes(&self, expression: &str) -> bool {
		!self.edits.is_empty() && self.apply_to(expression) != expression
	}
}

/// Rewrites applied to any expression, in attribute values and text alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ExpressionTransform {
	/// Drop the `vm.` controller alias.
	StripViewModelAlias,
}

impl ExpressionTransform {
	pub fn from_name(name: &str) -> NgupResult<Self> {
		match name {
			"strip-vm-alias" => Ok(Self::StripViewModelAlias),
			_ => Err(NgupError::UnknownExpressionTransform(name.to_string())),
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			Self::StripViewModelAlias => "strip-vm-alias",
		}
	}

	pub fn apply(self, expression: &str, start: usize) -> ExpressionRewrite {
		match self {
			Self::StripViewModelAlias => strip_view_model_alias(expression, start),
		}
	}
}

fn strip_view_model_alias(expression: &str, start: usize) -> ExpressionRewrite {
	const ALIAS: &str = "vm.";
	let mut rewrite = ExpressionRewrite::default();

	for (offset, _) in expression.match_indices(ALIAS) {
		// `myvm.x` and `a.vm.x` are member accesses, not the controller alias.
		let preceded_by_member = expression[..offset]
			.chars()
			.next_back()
			.is_some_and(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '$' | '.'));
		// `http://vm.example.com` is a host name.
		let inside_url = expression[..offset].ends_with("//");
		if preceded_by_member || inside_url {
			continue;
		}

		rewrite.edits.push(Edit {
			offset,
			length: ALIAS.len(),
			replacement: String::new(),
		});
		rewrite.messages.push(
			Message::info(
				start + offset,
				ALIAS.len(),
				"No longer needed to use the `vm` alias to access controller in Angular",
			)
			.with_url(QUICK_REFERENCE_URL),
		);
	}

	rewrite
}

/// The outcome of running one filter invocation through the pipe rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRewrite {
	/// Replacement for the whole chain, when it changed and nothing blocked
	/// it.
	pub replacement: Option<String>,
	pub messages: Vec<Message>,
}

/// An expression whose filter chains were rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChainRewrite {
	pub value: String,
	pub messages: Vec<Message>,
}

/// The complete rule configuration of a rewrite session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
	pub value_transforms: HashMap<String, ValueTransform>,
	pub pipe_transforms: HashMap<String, PipeTransform>,
	pub unsupported_attributes: HashSet<String>,
	pub unsupported_pipes: HashSet<String>,
	/// Tried in order; the first rule for a name wins.
	pub renames: Vec<AttributeRenameRule>,
	/// Tried in order; the first transform that changes an expression wins.
	pub expression_transforms: Vec<ExpressionTransform>,
}

impl Default for RuleSet {
	/// The built-in AngularJS to Angular catalogue.
	fn default() -> Self {
		Self {
			value_transforms: HashMap::from([
				("ng-show".to_string(), ValueTransform::HiddenNegation),
				("ng-repeat".to_string(), ValueTransform::RepeatToFor),
			]),
			pipe_transforms: HashMap::from([
				("limitTo".to_string(), PipeTransform::LimitToSlice),
				("currency".to_string(), PipeTransform::Currency),
			]),
			unsupported_attributes: DEFAULT_UNSUPPORTED_ATTRIBUTES
				.iter()
				.map(ToString::to_string)
				.collect(),
			unsupported_pipes: DEFAULT_UNSUPPORTED_PIPES
				.iter()
				.map(ToString::to_string)
				.collect(),
			renames: DEFAULT_RENAMES
				.iter()
				.map(|(old_name, new_name, url)| {
					AttributeRenameRule::new(*old_name, *new_name).with_url(*url)
				})
				.collect(),
			expression_transforms: vec![ExpressionTransform::StripViewModelAlias],
		}
	}
}

impl RuleSet {
	/// A rule set with no rules at all.
	pub fn empty() -> Self {
		Self {
			value_transforms: HashMap::new(),
			pipe_transforms: HashMap::new(),
			unsupported_attributes: HashSet::new(),
			unsupported_pipes: HashSet::new(),
			renames: vec![],
			expression_transforms: vec![],
		}
	}

	/// Build the rule set described by a `[rules]` config section.
	pub fn from_config(config: &RulesConfig) -> NgupResult<Self> {
		let mut rules = if config.use_defaults {
			Self::default()
		} else {
			Self::empty()
		};

		let configured_renames = config.rename.iter().map(|rename| {
			AttributeRenameRule {
				old_name: rename.from.clone(),
				new_name: rename.to.clone(),
				url: rename.url.clone(),
			}
		});
		rules.renames = configured_renames.chain(rules.renames).collect();

		rules
			.unsupported_attributes
			.extend(config.unsupported_attributes.iter().cloned());
		rules
			.unsupported_pipes
			.extend(config.unsupported_pipes.iter().cloned());

		for (attribute, transform) in &config.value_transforms {
			rules
				.value_transforms
				.insert(attribute.clone(), ValueTransform::from_name(transform)?);
		}
		for (pipe, transform) in &config.pipe_transforms {
			rules
				.pipe_transforms
				.insert(pipe.clone(), PipeTransform::from_name(transform)?);
		}
		if !config.expression_transforms.is_empty() {
			rules.expression_transforms = config
				.expression_transforms
				.iter()
				.map(|name| ExpressionTransform::from_name(name))
				.collect::<NgupResult<_>>()?;
		}

		Ok(rules)
	}

	pub fn value_transform(&self, attribute: &str) -> Option<ValueTransform> {
		self.value_transforms.get(attribute).copied()
	}

	pub fn rename_for(&self, attribute: &str) -> Option<&AttributeRenameRule> {
		self.renames.iter().find(|rule| rule.old_name == attribute)
	}

	pub fn is_unsupported_attribute(&self, attribute: &str) -> bool {
		self.unsupported_attributes.contains(attribute)
	}

	pub fn is_unsupported_pipe(&self, pipe: &str) -> bool {
		self.unsupported_pipes.contains(pipe)
	}

	/// Run one filter invocation through the pipe rules. Messages are
	/// anchored at `position` with `length`.
	///
	/// An unsupported filter yields an error and no replacement, even when a
	/// transform is also registered for its name.
	pub fn rewrite_filter(
		&self,
		invocation: &FilterInvocation,
		position: usize,
		length: usize,
	) -> FilterRewrite {
		let name = invocation.name();
		if self.is_unsupported_pipe(name) {
			return FilterRewrite {
				replacement: None,
				messages: vec![Message::error(
					position,
					length,
					format!("Unsupported filter(pipe) {name}"),
				)],
			};
		}

		let Some(transform) = self.pipe_transforms.get(name) else {
			return FilterRewrite::default();
		};

		let original = invocation.chain_text();
		let rewrite = transform.apply(invocation);
		if rewrite.value == original {
			return FilterRewrite::default();
		}

		FilterRewrite {
			messages: vec![
				Message::info(
					position,
					length,
					format!("Update filter {original} to pipe {}", rewrite.value),
				)
				.with_url(rewrite.url),
			],
			replacement: Some(rewrite.value),
		}
	}

	/// Rewrite every filter chain inside `expression`, anchoring all messages
	/// at `position` with `length`. Used for expressions nested inside a
	/// value transform, where the whole value is replaced at once.
	pub fn rewrite_filter_chain(
		&self,
		expression: &str,
		position: usize,
		length: usize,
	) -> FilterChainRewrite {
		let tokenized = tokenize(expression);
		if let Some(error) = &tokenized.error {
			tracing::debug!(%error, expression, "lexer stopped early");
		}

		let mut messages = vec![];
		let mut replacements = vec![];
		for invocation in parse_filters(&tokenized.tokens) {
			let rewrite = self.rewrite_filter(&invocation, position, length);
			messages.extend(rewrite.messages);
			if let Some(replacement) = rewrite.replacement {
				replacements.push((invocation.start(), invocation.end(), replacement));
			}
		}

		let mut value = expression.to_string();
		for (start, end, replacement) in replacements.into_iter().rev() {
			value.replace_range(start..end, &replacement);
		}

		FilterChainRewrite { value, messages }
	}

	/// Run the expression transforms in order. The first one that changes
	/// the expression wins and the rest are not attempted.
	pub fn rewrite_expression(&self, expression: &str, start: usize) -> ExpressionRewrite {
		self.expression_transforms
			.iter()
			.map(|transform| transform.apply(expression, start))
			.find(|rewrite| rewrite.changes(expression))
			.unwrap_or_default()
	}
}
