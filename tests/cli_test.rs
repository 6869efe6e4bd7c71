use clap::{CommandFactory, Parser};
use kiln::cli::Args;
use kiln::request::{Dialect, PackageManager};
use std::ffi::OsString;
use std::path::PathBuf;

fn make_args(args: &[&str]) -> Vec<OsString> {
    let mut res = vec![OsString::from("kiln")];
    res.extend(args.iter().map(OsString::from));
    res
}

#[test]
fn test_basic_args() {
    let parsed = Args::try_parse_from(make_args(&["./orders"])).unwrap();

    assert_eq!(parsed.directory, Some(PathBuf::from("./orders")));
    assert!(!parsed.dry_run);
    assert!(!parsed.yes);
    assert!(!parsed.verbose);
    assert_eq!(parsed.answers(), kiln::answers::Answers::default());
}

#[test]
fn test_directory_is_optional() {
    let parsed = Args::try_parse_from(make_args(&[])).unwrap();
    assert!(parsed.directory.is_none());
    // anything missing is prompted for, so clap never demands an argument
    assert!(Args::command().get_arguments().all(|arg| !arg.is_required_set()));
}

#[test]
fn test_all_selection_flags() {
    let args = make_args(&[
        "--name",
        "Order Tracking",
        "--language",
        "js",
        "--features",
        "auth, userCrud",
        "--providers",
        "postgres,prisma",
        "--frontend",
        "react-vite",
        "--package-manager",
        "pnpm",
        "./orders",
    ]);
    let answers = Args::try_parse_from(args).unwrap().answers();

    assert_eq!(answers.name.as_deref(), Some("Order Tracking"));
    assert_eq!(answers.language, Some(Dialect::JavaScript));
    assert_eq!(answers.features, Some(vec!["auth".to_string(), "userCrud".to_string()]));
    assert_eq!(answers.providers, Some(vec!["postgres".to_string(), "prisma".to_string()]));
    assert_eq!(answers.frontend.as_deref(), Some("react-vite"));
    assert_eq!(answers.package_manager, Some(PackageManager::Pnpm));
    assert!(answers.is_complete());
}

#[test]
fn test_empty_feature_list_selects_none() {
    let parsed = Args::try_parse_from(make_args(&["--features", "", "./api"])).unwrap();
    assert_eq!(parsed.answers().features, Some(vec![]));
}

#[test]
fn test_behaviour_flags() {
    let args = make_args(&["--dry-run", "-y", "--skip-post-steps", "--keep-partial", "-v", "--templates", "/tmp/t", "./api"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert!(parsed.dry_run);
    assert!(parsed.yes);
    assert!(parsed.skip_post_steps);
    assert!(parsed.keep_partial);
    assert!(parsed.verbose);
    assert_eq!(parsed.templates, Some(PathBuf::from("/tmp/t")));
}

#[test]
fn test_unknown_language_is_rejected() {
    assert!(Args::try_parse_from(make_args(&["--language", "python", "./api"])).is_err());
}

#[test]
fn test_answers_conflicts_with_stdin() {
    assert!(Args::try_parse_from(make_args(&["--answers", "a.json", "--stdin", "./api"])).is_err());
}

#[test]
fn test_too_many_args() {
    assert!(Args::try_parse_from(make_args(&["./api", "extra"])).is_err());
}
