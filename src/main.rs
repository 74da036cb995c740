use clap::{Parser, Subcommand};
use serde::Serialize;
use simple_blog::directory::FsProbe;
use simple_blog::layout::ThemeLayouts;
use simple_blog::metadata::ScopePages;
use simple_blog::plan::{BlogPlan, ResolveContext};
use simple_blog::types::Page;
use simple_blog::{config, output, plan, populate, scan};
use std::path::PathBuf;

/// Shared flags for commands that print a plan.
#[derive(clap::Args, Clone)]
struct OutputArgs {
    /// Print the full result as JSON instead of the summary
    #[arg(long)]
    json: bool,
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "simple-blog")]
#[command(about = "Resolve blog classifiers into pages, listings and services")]
#[command(long_about = "\
Resolve blog classifiers into pages, listings and services

Directory classifiers turn a content directory into a paginated listing.
Metadata classifiers group pages by frontmatter values (tags, categories)
and get one listing per value.

Content structure:

  content/
  ├── config.toml                  # Classifiers and services
  ├── about.md                     # Page outside any classifier
  ├── posts/                       # Target of a directory classifier
  │   ├── hello.md                 # +++ TOML frontmatter +++, then body
  │   └── 2024/
  │       └── recap.md
  └── .drafts/                     # Hidden = never scanned

Missing classifier directories and unknown comment services are reported
as warnings and skipped. Set RUST_LOG=debug for resolution details.

Run 'simple-blog gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve the configured classifiers and services
    Plan(OutputArgs),
    /// Resolve, scan pages, and show what each classifier contains
    Classify(OutputArgs),
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[derive(Serialize)]
struct ClassifyReport<'a> {
    plan: &'a BlogPlan,
    scope: ScopePages,
    pages: &'a [Page],
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Plan(args) => {
            let config = config::load_config(&cli.source)?;
            let layouts = ThemeLayouts::from_config(&config.theme);
            let ctx = ResolveContext::new(&cli.source, &layouts, &FsProbe);
            let blog = plan::resolve(&config, &ctx)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&blog)?);
            } else {
                output::print_plan_output(&blog);
            }
        }
        Command::Classify(args) => {
            let config = config::load_config(&cli.source)?;
            let layouts = ThemeLayouts::from_config(&config.theme);
            let ctx = ResolveContext::new(&cli.source, &layouts, &FsProbe);
            let blog = plan::resolve(&config, &ctx)?;

            let pages = scan::scan_pages(&cli.source)?;
            let classifications = &blog.classification.classifications;
            populate::populate(classifications, &pages);

            if args.json {
                let report = ClassifyReport {
                    plan: &blog,
                    scope: populate::scope_pages(
                        classifications,
                        &config.global_pagination,
                        &layouts,
                    ),
                    pages: &pages,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_classification_output(
                    &blog.classification,
                    &pages,
                    &config.global_pagination,
                    &layouts,
                );
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr so `--json` output stays parseable. Warnings show by
/// default; `RUST_LOG` adds more.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();
}
