mod common;

use ngup_core::AnyEmptyResult;
use predicates::prelude::PredicateBooleanExt;

#[test]
fn update_rewrites_templates_in_place() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir_all(tmp.path().join("src/app"))?;
	std::fs::write(
		tmp.path().join("src/app/form.html"),
		"<form ng-submit=\"vm.save()\">\n  <input ng-model=\"vm.name\">\n  <br></br>\n</form>\n",
	)?;

	let mut cmd = common::ngup_cmd();
	let _ = cmd
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Updated 1 template(s)."));

	let content = std::fs::read_to_string(tmp.path().join("src/app/form.html"))?;
	assert_eq!(
		content,
		"<form (ngSubmit)=\"save()\">\n  <input name=\"modelName31\" [(ngModel)]=\"name\">\n  \
		 <br>\n</form>\n"
	);

	Ok(())
}

#[test]
fn update_dry_run_leaves_files_alone() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("index.html"),
		"<p>{{ items | limitTo:2:1 }}</p>\n",
	)?;

	let mut cmd = common::ngup_cmd();
	let _ = cmd
		.arg("update")
		.arg("--dry-run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(
			predicates::str::contains("Dry run: would update 1 template(s):")
				.and(predicates::str::contains("index.html")),
		);

	let content = std::fs::read_to_string(tmp.path().join("index.html"))?;
	assert_eq!(content, "<p>{{ items | limitTo:2:1 }}</p>\n");

	Ok(())
}

#[test]
fn update_keeps_constructs_with_errors() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("index.html"),
		"<li ng-repeat=\"item in items track by item.id\" ng-click=\"open(item)\"></li>\n",
	)?;

	let mut cmd = common::ngup_cmd();
	let _ = cmd
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stderr(predicates::str::contains(
			"error Unsupported expression `track by` use `trackBy` instead",
		));

	let content = std::fs::read_to_string(tmp.path().join("index.html"))?;
	assert_eq!(
		content,
		"<li ng-repeat=\"item in items track by item.id\" (click)=\"open(item)\"></li>\n"
	);

	Ok(())
}

#[test]
fn update_noop_when_already_migrated() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("index.html"), "<p *ngIf=\"ok\">{{ a | slice:0:2 }}</p>\n")?;

	let mut cmd = common::ngup_cmd();
	let _ = cmd
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("All templates are already migrated."));

	Ok(())
}
