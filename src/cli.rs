use clap::{Args, Parser, Subcommand};

use crate::matcher::DEFAULT_FUZZY_THRESHOLD;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Migrate legacy HTML books into the posts collection.
    Migrate(MigrateArgs),
    /// Print one book's contributors, sorted by name, as JSON lines.
    Contributors(ContributorsArgs),
}

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Site root (holds `_config.yml`, `_html/` and `_posts/`).
    #[arg(long)]
    pub site: String,

    /// Directory with one sub-directory per book (default: `<site>/_html`).
    #[arg(long)]
    pub html: Option<String>,

    /// Posts collection to create and update (default: `<site>/_posts`).
    #[arg(long)]
    pub posts: Option<String>,

    /// Similarity a biography name must exceed to reuse a known person.
    #[arg(long, default_value_t = DEFAULT_FUZZY_THRESHOLD)]
    pub fuzzy_threshold: f64,

    /// Date every book in January instead of ordering books within a year.
    #[arg(long, default_value_t = false)]
    pub no_synthetic_months: bool,

    /// Copyright holder named on generated rights pages.
    #[arg(long, default_value = "New York University")]
    pub rights_holder: String,
}

#[derive(Debug, Args)]
pub struct ContributorsArgs {
    /// Site root.
    #[arg(long)]
    pub site: String,

    /// Book slug (its directory name under `_html/`).
    #[arg(long)]
    pub book: String,

    /// Posts collection (default: `<site>/_posts`).
    #[arg(long)]
    pub posts: Option<String>,
}
