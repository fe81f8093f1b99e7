use catalog_sync::report::print_report;
use catalog_sync::run::{self, RunOptions};
use catalog_sync::reconcile::FixOptions;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "catalog-sync")]
#[command(about = "Validate and reconcile multi-language template catalog indexes")]
#[command(long_about = "\
Validate and reconcile multi-language template catalog indexes

The English index.json is the single source of truth. Every translated
variant must carry the same templates, in the same order, with identical
structural fields — only titles, descriptions, tags, and tutorial links
may differ.

Templates directory layout:

  templates/
  ├── index.json             # English reference
  ├── index.fr.json          # French variant
  ├── index.zh-TW.json       # Language code between the dots
  ├── index.schema.json      # JSON schema (ignored)
  └── *.json / *.webp        # Per-template workflows and thumbnails

'check' reports every divergence and exits non-zero when any exists.
'fix' rewrites each variant to match the reference: templates are
reordered and completed from the reference, structural fields are
overwritten, and missing translatable fields are filled with English
placeholders. Templates present only in a variant are never deleted,
but they keep the run failing until removed by hand.")]
#[command(version = version_string())]
struct Cli {
    /// Templates directory holding index.json and its language variants
    #[arg(long, default_value = "templates", global = true)]
    templates_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate language indexes against the reference without writing
    Check(LanguageArgs),
    /// Rewrite language indexes to match the reference
    Fix(FixArgs),
}

/// Language selection shared by both commands.
#[derive(clap::Args, Clone)]
struct LanguageArgs {
    /// Limit to specific language codes (repeatable). Default: every
    /// index.<lang>.json found in the templates directory.
    #[arg(long = "language", value_name = "CODE")]
    languages: Vec<String>,
}

#[derive(clap::Args, Clone)]
struct FixArgs {
    #[command(flatten)]
    selection: LanguageArgs,

    /// Overwrite tag lists that diverge from the reference instead of
    /// only adding missing tags
    #[arg(long)]
    force_tags: bool,

    /// Overwrite titles and descriptions with the English reference text
    #[arg(long)]
    force_text: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let options = match cli.command {
        Command::Check(selection) => RunOptions {
            templates_dir: cli.templates_dir,
            fix: None,
            languages: selection.languages,
        },
        Command::Fix(args) => RunOptions {
            templates_dir: cli.templates_dir,
            fix: Some(FixOptions {
                force_tags: args.force_tags,
                force_text: args.force_text,
            }),
            languages: args.selection.languages,
        },
    };

    match run::run(&options) {
        Ok(report) => {
            print_report(&report);
            if report.is_clean() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(error) => {
            eprintln!("Error: {error}");
            ExitCode::FAILURE
        }
    }
}
