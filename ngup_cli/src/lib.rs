use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Migrate AngularJS templates to Angular template syntax.",
	long_about = "ngup rewrites AngularJS directives, filters and expressions in HTML templates into \
	              their Angular equivalents.\n\nEvery rewrite is reported as an info diagnostic. \
	              Constructs that cannot be migrated automatically are reported as errors and left \
	              untouched.\n\nQuick start:\n  ngup check   Report what would change\n  ngup \
	              update  Rewrite templates in place"
)]
pub struct NgupCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Report the rewrites and errors for every template without writing.
	///
	/// Scans the project for templates selected by `ngup.toml` (all `*.html`
	/// files by default), rewrites each one in memory and prints its
	/// diagnostics. Exits with a non-zero status code when any template would
	/// change or contains constructs that cannot be migrated.
	///
	/// Ideal for CI pipelines. Use `--diff` to see the rewritten text and
	/// `--format json` for programmatic consumption.
	Check {
		/// Show a unified diff for each template that would change.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Output format for check results. Use `text` for human-readable
		/// output or `json` for programmatic consumption.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Rewrite templates in place.
	///
	/// Templates with errors are still rewritten; the constructs that caused
	/// the errors are left as they were.
	Update {
		/// Preview changes without writing files. Prints which files would
		/// be modified.
		#[arg(long, default_value_t = false)]
		dry_run: bool,
	},
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption. Each entry includes the
	/// file path, whether it would change, and its diagnostics.
	Json,
}
