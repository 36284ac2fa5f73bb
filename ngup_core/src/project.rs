use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;

use crate::NgupConfig;
use crate::NgupError;
use crate::NgupResult;

/// Find every template under `root` selected by the config's include
/// patterns, skipping excluded and (unless disabled) gitignored paths.
/// Returned paths are sorted.
pub fn discover_templates(root: &Path, config: &NgupConfig) -> NgupResult<Vec<PathBuf>> {
	let include_set = build_glob_set(&config.include.patterns)?;
	let exclude = build_exclude_matcher(root, &config.exclude.patterns)?;
	let gitignore = if config.disable_gitignore {
		Gitignore::empty()
	} else {
		build_gitignore(root)
	};

	let walker = TemplateWalker {
		root,
		include_set: &include_set,
		exclude: &exclude,
		gitignore: &gitignore,
	};
	let mut files = vec![];
	walker.walk(root, &mut files)?;
	files.sort();

	tracing::debug!(root = %root.display(), templates = files.len(), "discovered templates");
	Ok(files)
}

fn build_glob_set(patterns: &[String]) -> NgupResult<GlobSet> {
	let mut builder = GlobSetBuilder::new();
	for pattern in patterns {
		let glob = Glob::new(pattern).map_err(|e| {
			NgupError::InvalidPattern {
				pattern: pattern.clone(),
				reason: e.to_string(),
			}
		})?;
		builder.add(glob);
	}

	builder.build().map_err(|e| {
		NgupError::InvalidPattern {
			pattern: patterns.join(", "),
			reason: e.to_string(),
		}
	})
}

/// `[exclude]` patterns follow `.gitignore` syntax.
fn build_exclude_matcher(root: &Path, patterns: &[String]) -> NgupResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			NgupError::InvalidPattern {
				pattern: pattern.clone(),
				reason: e.to_string(),
			}
		})?;
	}

	builder.build().map_err(|e| {
		NgupError::InvalidPattern {
			pattern: patterns.join(", "),
			reason: e.to_string(),
		}
	})
}

fn build_gitignore(root: &Path) -> Gitignore {
	let mut builder = GitignoreBuilder::new(root);
	let gitignore_path = root.join(".gitignore");
	if gitignore_path.is_file() {
		if let Some(error) = builder.add(&gitignore_path) {
			tracing::warn!(%error, "skipping unreadable .gitignore");
		}
	}

	builder.build().unwrap_or_else(|error| {
		tracing::warn!(%error, "ignoring invalid .gitignore");
		Gitignore::empty()
	})
}

fn is_ignored_directory_name(name: &str) -> bool {
	name.starts_with('.') || name == "node_modules" || name == "target"
}

struct TemplateWalker<'a> {
	root: &'a Path,
	include_set: &'a GlobSet,
	exclude: &'a Gitignore,
	gitignore: &'a Gitignore,
}

impl TemplateWalker<'_> {
	fn walk(&self, dir: &Path, files: &mut Vec<PathBuf>) -> NgupResult<()> {
		for entry in std::fs::read_dir(dir)? {
			let entry = entry?;
			let path = entry.path();
			// Symlinked directories are not followed.
			let is_dir = entry.file_type()?.is_dir();

			if is_dir
				&& path
					.file_name()
					.and_then(|name| name.to_str())
					.is_some_and(is_ignored_directory_name)
			{
				continue;
			}

			if self.gitignore.matched(&path, is_dir).is_ignore()
				|| self.exclude.matched(&path, is_dir).is_ignore()
			{
				continue;
			}

			if is_dir {
				self.walk(&path, files)?;
			} else if path
				.strip_prefix(self.root)
				.is_ok_and(|relative| self.include_set.is_match(relative))
			{
				files.push(path);
			}
		}

		Ok(())
	}
}
