//! `ngup_core` is the rewrite engine behind ngup, a tool that migrates AngularJS templates to Angular template syntax. It rewrites directives, filters and expressions in place and reports every rewrite, and every construct it cannot migrate, as a positioned diagnostic.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Template text
//!   → Markup scanner (elements, attributes and text nodes with byte spans)
//!   → Orchestrator (post-order walk, one occurrence per attribute or text node)
//!       → Tokenizer (expression tokens)
//!       → Filter parser (`| name:arg:arg` invocations)
//!       → Rule set (renames, value/pipe/expression transforms, unsupported lists)
//!   → Patch buffer (edits keyed by original offsets, rendered once)
//!   → Void end tag cleanup
//!   → Rewritten text + diagnostics sorted by level
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Loads `ngup.toml`, with its rule overrides and include/exclude patterns.
//! - [`markup`]: Span-preserving scanner that turns a template into [`Node`]s.
//! - [`project`]: Template discovery across a directory tree.
//! - [`rules`]: The [`RuleSet`] tables and the transforms they dispatch to.
//!
//! ## Key Types
//!
//! - [`TemplateUpdater`]: A rewrite session; caches the result for identical input.
//! - [`RewriteResult`]: Rewritten text, original text and diagnostics.
//! - [`PatchBuffer`]: Chunked, offset-stable edit buffer over the original text.
//! - [`Diagnostic`]: A message resolved to a line and character.
//!
//! ## Quick Start
//!
//! ```rust
//! use ngup_core::RuleSet;
//! use ngup_core::TemplateUpdater;
//!
//! let mut updater = TemplateUpdater::new(RuleSet::default());
//! let result = updater
//! 	.rewrite(r#"<li ng-repeat="item in items">{{ item.price | currency:'EUR' }}</li>"#)
//! 	.unwrap();
//!
//! assert_eq!(
//! 	result.rewritten_text,
//! 	r#"<li *ngFor="let item of items">{{ item.price | currency:'EUR' }}</li>"#
//! );
//! assert!(!result.has_errors());
//! ```

pub use config::*;
pub use error::*;
pub use filters::parse_filters;
pub use lexer::LexError;
pub use lexer::Tokenized;
pub use lexer::tokenize;
pub use markup::Attribute;
pub use markup::Element;
pub use markup::Node;
pub use markup::Span;
pub use markup::TextNode;
pub use markup::parse_fragment;
pub use message::*;
pub use patch::*;
pub use position::*;
pub use project::*;
pub use rules::RuleSet;
pub use tokens::*;
pub use updater::*;

pub mod config;
mod currencies;
#[allow(unused_assignments)]
mod error;
mod filters;
mod lexer;
pub mod markup;
mod message;
mod patch;
mod position;
pub mod project;
pub mod rules;
mod tokens;
mod updater;

#[cfg(test)]
mod __fixtures;
