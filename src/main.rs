//! kiln's main application entry point.
//! Merges flags, answers and prompts into a generation request, runs the
//! engine and finishes with the optional post-generation steps.

use std::path::{Path, PathBuf};

use kiln::{
    answers::{complete_answers, load_answers_file, load_answers_from_stdin, Answers},
    catalog::Catalog,
    cli::{get_args, Args},
    constants::BUNDLED_TEMPLATES,
    engine::{Engine, GenerationReport},
    error::{default_error_handler, Result},
    hooks::{next_steps, post_steps, run_post_steps, StepOutcome},
    prompt::{DefaultsPrompter, DialoguerPrompter, Prompter},
    request::ensure_safe_destination,
};
use log::warn;

/// Main application entry point.
fn main() {
    let args = get_args();

    env_logger::Builder::new()
        .filter_level(if args.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info })
        .init();

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Resolves the target directory and rejects an unusable one
/// 2. Merges flags over answers over prompts
/// 3. Generates the project, removing a directory it created on failure
/// 4. Runs the post-generation steps and prints what to do next
fn run(args: Args) -> Result<()> {
    let prompt: Box<dyn Prompter> =
        if args.yes { Box::new(DefaultsPrompter) } else { Box::new(DialoguerPrompter::new()) };
    let catalog = Catalog::builtin();

    let directory = match &args.directory {
        Some(directory) => directory.clone(),
        None => PathBuf::from(prompt.input("Directory", "my-api")?),
    };
    let target = std::path::absolute(&directory)?;
    if !args.dry_run {
        ensure_safe_destination(&target)?;
    }

    let preloaded = if args.stdin {
        load_answers_from_stdin()?
    } else if let Some(path) = &args.answers {
        load_answers_file(path)?
    } else {
        Answers::default()
    };
    let answers = complete_answers(args.answers().or(preloaded), &catalog, &*prompt, &target)?;
    let request = answers.into_request(&target, args.dry_run);

    let templates = args.templates.clone().unwrap_or_else(|| PathBuf::from(BUNDLED_TEMPLATES));
    let engine = Engine::new(&catalog, templates);

    let existed = target.exists();
    let report = match engine.generate(&request) {
        Ok(report) => report,
        Err(err) => {
            if !request.dry_run && !existed && !args.keep_partial {
                remove_partial(&target);
            }
            return Err(err);
        }
    };

    print_report(&target, &report);
    if report.dry_run {
        return Ok(());
    }

    let mut installed = false;
    let mut tests_ran = false;
    if !args.skip_post_steps && (args.yes || prompt.confirm("Install packages and run the tests now?", false)?) {
        for (step, outcome) in run_post_steps(&target, &post_steps(&report.context)) {
            match (step.label, outcome) {
                ("install", StepOutcome::Succeeded) => installed = true,
                ("test", StepOutcome::Succeeded | StepOutcome::Failed(_)) => tests_ran = true,
                _ => {}
            }
        }
    }

    println!("\nNext steps:");
    for line in next_steps(&target, &report.context, installed, tests_ran) {
        println!("  {line}");
    }
    Ok(())
}

fn remove_partial(target: &Path) {
    if !target.exists() {
        return;
    }
    warn!("Removing partially generated {}", target.display());
    if let Err(e) = std::fs::remove_dir_all(target) {
        warn!("Could not remove {}: {e}", target.display());
    }
}

fn print_report(target: &Path, report: &GenerationReport) {
    let context = &report.context;
    let verb = if report.dry_run { "Would generate" } else { "Generated" };
    println!("{verb} {} ({}) in {}", context.project.title, context.dialect, target.display());
    if !context.feature_keys.is_empty() {
        println!("Features: {}", context.feature_keys.join(", "));
    }
    if !context.provider_keys.is_empty() {
        println!("Providers: {}", context.provider_keys.join(", "));
    }
    if let Some(frontend) = &context.frontend {
        println!("Front-end: {} in {}/", frontend.name, frontend.app_directory);
    }
    if report.dry_run {
        for file in report.relative_files(target) {
            println!("  {}", file.display());
        }
    } else {
        println!("{} files written", report.files.len());
    }
}
