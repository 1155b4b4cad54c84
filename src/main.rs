use clap::{Parser, Subcommand, ValueEnum};
use newsroom::model::ContentKind;
use newsroom::store::Store;
use newsroom::{config, report, sync};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "newsroom")]
#[command(about = "File-to-database-to-static-HTML content pipeline")]
#[command(long_about = "\
File-to-database-to-static-HTML content pipeline

Plain-text files are the editorial interface. Each content kind lives in its
own directory under the content root; sync reconciles those files against the
SQLite store and regenerates the static site.

Content structure:

  content/
  ├── authors/
  │   └── jane-doe.txt             # Name: Jane Doe / Title: ... / --- / bio
  ├── categories/
  │   └── tech.txt                 # Name: Technology / Slug: tech / Color: blue
  ├── articles/
  │   └── hello.txt                # Title / Author / Category, then body
  └── trending/
      └── ai-tools.txt             # Title / Heat Score, then description

Every file is a 'Key: Value' metadata block, a '---' separator line, and a
free-text body. Article bodies split into sections on '## Heading' lines.

Records are added and deleted only. Identity is the slug: a file whose
content changed stays untouched until it is deleted and recreated. Articles
must name an existing author (by exact name) and category (by exact slug);
files that fail to parse or resolve are skipped and reported, never aborting
the rest of the run.")]
#[command(version)]
struct Cli {
    /// Config file (optional; defaults apply when absent)
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Content directory (overrides config)
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Output directory (overrides config)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// SQLite database path (overrides config)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reconcile content files with the store and regenerate the site
    Sync {
        /// Sync only one content kind (aggregates still regenerate)
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
        /// Emit the run report as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show store diagnostics: paths, tables, foreign-key state
    Status,
    /// Show per-kind record counts
    Stats,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Authors,
    Categories,
    Articles,
    Trending,
}

impl From<KindArg> for ContentKind {
    fn from(arg: KindArg) -> ContentKind {
        match arg {
            KindArg::Authors => ContentKind::Authors,
            KindArg::Categories => ContentKind::Categories,
            KindArg::Articles => ContentKind::Articles,
            KindArg::Trending => ContentKind::Trending,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut site_config = config::load_config(&cli.config)?;
    if let Some(source) = &cli.source {
        site_config.content_root = source.display().to_string();
    }
    if let Some(output) = &cli.output {
        site_config.output_root = output.display().to_string();
    }
    if let Some(db) = &cli.db {
        site_config.db_path = db.display().to_string();
    }

    let store = Store::open(Path::new(&site_config.db_path))?;

    match cli.command {
        Command::Sync { kind, json } => {
            let content_root = PathBuf::from(&site_config.content_root);
            let output_root = PathBuf::from(&site_config.output_root);
            let run = match kind {
                Some(arg) => sync::sync_kinds(
                    &store,
                    &site_config,
                    &[arg.into()],
                    &content_root,
                    &output_root,
                )?,
                None => sync::sync_all(&store, &site_config, &content_root, &output_root)?,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&run)?);
            } else {
                report::print_run_report(&run);
            }
            if run.has_failures() {
                std::process::exit(1);
            }
        }
        Command::Status => {
            let tables = store.table_names()?;
            let foreign_keys = store.foreign_keys_enabled()?;
            report::print_status(&site_config, &tables, foreign_keys);
        }
        Command::Stats => {
            let counts = store.counts()?;
            report::print_stats(&counts);
        }
    }

    Ok(())
}
