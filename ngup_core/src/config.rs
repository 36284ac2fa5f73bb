use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::NgupError;
use crate::NgupResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["ngup.toml", ".ngup.toml", ".config/ngup.toml"];

/// Template files scanned when no `[include]` patterns are configured.
pub const DEFAULT_INCLUDE_PATTERNS: [&str; 1] = ["**/*.html"];

/// Configuration loaded from an `ngup.toml` file.
///
/// ```toml
/// disable_gitignore = false
///
/// [rules]
/// use_defaults = true
/// unsupported_attributes = ["ng-bind-template"]
/// unsupported_pipes = ["json"]
/// expression_transforms = ["strip-vm-alias"]
///
/// [[rules.rename]]
/// from = "ng-bind"
/// to = "[textContent]"
/// url = "https://angular.io/guide/template-syntax"
///
/// [rules.value_transforms]
/// ng-hide = "hidden-negation"
///
/// [rules.pipe_transforms]
/// limitTo = "limit-to-slice"
///
/// [include]
/// patterns = ["src/**/*.html"]
///
/// [exclude]
/// patterns = ["vendor/"]
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct NgupConfig {
	/// Rule table overrides and extensions.
	#[serde(default)]
	pub rules: RulesConfig,
	/// Glob patterns selecting the template files to migrate.
	#[serde(default)]
	pub include: IncludeConfig,
	/// Gitignore-style patterns for files that are never migrated.
	#[serde(default)]
	pub exclude: ExcludeConfig,
	/// When true, `.gitignore` files are not used for filtering.
	#[serde(default)]
	pub disable_gitignore: bool,
}

/// The `[rules]` section. Everything here is layered on top of the default
/// catalogue unless `use_defaults` is `false`.
#[derive(Debug, Deserialize)]
pub struct RulesConfig {
	/// Start from the built-in rule catalogue. Defaults to `true`.
	#[serde(default = "default_true")]
	pub use_defaults: bool,
	/// Attribute renames. These take precedence over default renames of the
	/// same attribute.
	#[serde(default)]
	pub rename: Vec<RenameConfig>,
	/// Attribute names that always produce an error.
	#[serde(default)]
	pub unsupported_attributes: Vec<String>,
	/// Filter names that always produce an error.
	#[serde(default)]
	pub unsupported_pipes: Vec<String>,
	/// Attribute name to value transform name.
	#[serde(default)]
	pub value_transforms: BTreeMap<String, String>,
	/// Filter name to pipe transform name.
	#[serde(default)]
	pub pipe_transforms: BTreeMap<String, String>,
	/// Expression transform names, tried in order. Replaces the default list
	/// when non-empty.
	#[serde(default)]
	pub expression_transforms: Vec<String>,
}

impl Default for RulesConfig {
	fn default() -> Self {
		Self {
			use_defaults: true,
			rename: vec![],
			unsupported_attributes: vec![],
			unsupported_pipes: vec![],
			value_transforms: BTreeMap::new(),
			pipe_transforms: BTreeMap::new(),
			expression_transforms: vec![],
		}
	}
}

/// A single `[[rules.rename]]` entry.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RenameConfig {
	pub from: String,
	pub to: String,
	#[serde(default)]
	pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IncludeConfig {
	#[serde(default = "default_include_patterns")]
	pub patterns: Vec<String>,
}

impl Default for IncludeConfig {
	fn default() -> Self {
		Self {
			patterns: default_include_patterns(),
		}
	}
}

#[derive(Debug, Default, Deserialize)]
pub struct ExcludeConfig {
	#[serde(default)]
	pub patterns: Vec<String>,
}

fn default_true() -> bool {
	true
}

fn default_include_patterns() -> Vec<String> {
	DEFAULT_INCLUDE_PATTERNS.iter().map(ToString::to_string).collect()
}

impl NgupConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> NgupResult<Option<NgupConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		tracing::debug!(path = %config_path.display(), "loading config");
		Self::parse(&content).map(Some)
	}

	/// Parse config from TOML text.
	pub fn parse(content: &str) -> NgupResult<NgupConfig> {
		toml::from_str(content).map_err(|e| NgupError::ConfigParse(e.to_string()))
	}

	/// Like [`NgupConfig::load`], falling back to defaults when no config
	/// file exists.
	pub fn load_or_default(root: &Path) -> NgupResult<NgupConfig> {
		Ok(Self::load(root)?.unwrap_or_default())
	}
}
