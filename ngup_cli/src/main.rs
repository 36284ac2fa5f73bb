use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use ngup_cli::Commands;
use ngup_cli::NgupCli;
use ngup_cli::OutputFormat;
use ngup_core::Diagnostic;
use ngup_core::Level;
use ngup_core::NgupConfig;
use ngup_core::RewriteResult;
use ngup_core::RuleSet;
use ngup_core::TemplateUpdater;
use ngup_core::discover_templates;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = NgupCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match args.command {
		Some(Commands::Check { diff, format }) => {
			run_check(&args, diff, format).map(|failed| {
				if failed {
					process::exit(1);
				}
			})
		}
		Some(Commands::Update { dry_run }) => run_update(&args, dry_run),
		None => {
			eprintln!("No subcommand specified. Run `ngup --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		match e.downcast::<ngup_core::NgupError>() {
			Ok(ngup_err) => {
				let report: miette::Report = (*ngup_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Logs go to stderr. `RUST_LOG` overrides the level chosen by `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.without_time()
		.init();
}

fn resolve_root(args: &NgupCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// A template and the outcome of rewriting it.
struct TemplateReport {
	path: PathBuf,
	result: RewriteResult,
}

impl TemplateReport {
	fn fails_check(&self) -> bool {
		self.result.has_changes() || self.result.has_errors()
	}
}

fn rewrite_project(root: &Path) -> Result<Vec<TemplateReport>, Box<dyn std::error::Error>> {
	let config = NgupConfig::load_or_default(root)?;
	let rules = RuleSet::from_config(&config.rules)?;
	let files = discover_templates(root, &config)?;
	let mut updater = TemplateUpdater::new(rules);

	let mut reports = Vec::with_capacity(files.len());
	for path in files {
		let content = std::fs::read_to_string(&path)?;
		let result = updater.rewrite(&content)?.clone();
		tracing::debug!(
			path = %path.display(),
			diagnostics = result.diagnostics.len(),
			"rewrote template"
		);
		reports.push(TemplateReport { path, result });
	}

	Ok(reports)
}

fn run_check(
	args: &NgupCli,
	show_diff: bool,
	format: OutputFormat,
) -> Result<bool, Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let reports = rewrite_project(&root)?;
	let failing = reports
		.iter()
		.filter(|report| report.fails_check())
		.collect::<Vec<_>>();

	if format == OutputFormat::Json {
		let templates = reports
			.iter()
			.filter(|report| !report.result.is_unchanged())
			.map(|report| {
				serde_json::json!({
					"file": make_relative(&report.path, &root),
					"changed": report.result.has_changes(),
					"diagnostics": report.result.diagnostics,
				})
			})
			.collect::<Vec<_>>();
		let output = serde_json::json!({
			"ok": failing.is_empty(),
			"templates": templates,
		});
		println!("{output}");
		return Ok(!failing.is_empty());
	}

	if failing.is_empty() {
		println!(
			"Check passed: {} template(s) need no changes.",
			reports.len()
		);
		return Ok(false);
	}

	eprintln!("{}", colored!("Check failed.", bold));
	for report in &failing {
		let rel = make_relative(&report.path, &root);
		eprintln!();
		for diagnostic in &report.result.diagnostics {
			print_diagnostic(&rel, diagnostic);
		}

		if show_diff && report.result.has_changes() {
			print_diff(&report.result.original_text, &report.result.rewritten_text);
		}
	}

	eprintln!();
	eprintln!("{}", check_summary(&failing));
	Ok(true)
}

fn check_summary(failing: &[&TemplateReport]) -> String {
	let changed = failing
		.iter()
		.filter(|report| report.result.has_changes())
		.count();
	let errors = failing
		.iter()
		.flat_map(|report| &report.result.diagnostics)
		.filter(|diagnostic| diagnostic.level == Level::Error)
		.count();

	let mut parts = Vec::new();
	if changed > 0 {
		parts.push(format!("{changed} template(s) would change"));
	}
	if errors > 0 {
		parts.push(format!("{errors} construct(s) need manual migration"));
	}
	parts.join(", ")
}

fn run_update(args: &NgupCli, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let reports = rewrite_project(&root)?;

	for report in reports.iter().filter(|report| report.result.has_errors()) {
		let rel = make_relative(&report.path, &root);
		for diagnostic in &report.result.diagnostics {
			if diagnostic.level == Level::Error {
				print_diagnostic(&rel, diagnostic);
			}
		}
	}

	let changed = reports
		.iter()
		.filter(|report| report.result.has_changes())
		.collect::<Vec<_>>();
	if changed.is_empty() {
		println!("All templates are already migrated.");
		return Ok(());
	}

	if dry_run {
		println!("Dry run: would update {} template(s):", changed.len());
		for report in &changed {
			println!("  {}", make_relative(&report.path, &root));
		}
		return Ok(());
	}

	for report in &changed {
		std::fs::write(&report.path, &report.result.rewritten_text)?;
	}
	println!("Updated {} template(s).", changed.len());

	if args.verbose {
		for report in &changed {
			println!("  {}", make_relative(&report.path, &root));
		}
	}

	Ok(())
}

/// Print a diagnostic as `file:line:character level message`.
fn print_diagnostic(rel_path: &str, diagnostic: &Diagnostic) {
	let level = match diagnostic.level {
		Level::Error => colored!("error", red),
		Level::Info => colored!("info", yellow),
	};
	eprintln!(
		"{rel_path}:{} {level} {}",
		diagnostic.position, diagnostic.message
	);
	if let Some(url) = &diagnostic.url {
		eprintln!("  see {url}");
	}
}

/// Print a unified diff between two strings, colorized.
fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
