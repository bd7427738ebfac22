use std::io::Write as _;
use std::path::Path;

use anyhow::Context as _;
use indexmap::IndexSet;
use serde::Serialize;

use crate::cli::ContributorsArgs;
use crate::config::{SITE_ENV_VAR, SiteEnv, contributors_posts_dir};
use crate::document::Layout;
use crate::registry::Registry;
use crate::text::slugify;

/// One contributor of a book, as the contributors page lists them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributorEntry {
    pub uuid: String,
    pub title: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// `slugify("<last> <first>")`; only ever computed here.
    pub sortable_name: String,
    pub permalink: Option<String>,
}

/// Entry point for `bookmigrate contributors`.
pub fn run(args: ContributorsArgs) -> anyhow::Result<()> {
    if SiteEnv::from_env().suppresses_site_hooks() {
        tracing::info!("{SITE_ENV_VAR} is a migration mode; skipping contributor index");
        return Ok(());
    }

    let posts_dir = contributors_posts_dir(&args);
    let entries = load(&posts_dir, &args.book)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for entry in &entries {
        serde_json::to_writer(&mut out, entry).context("serialize contributor")?;
        out.write_all(b"\n").context("write contributor newline")?;
    }
    out.flush().context("flush contributors")?;
    Ok(())
}

pub fn load(posts_dir: &Path, book_slug: &str) -> anyhow::Result<Vec<ContributorEntry>> {
    if !posts_dir.is_dir() {
        anyhow::bail!("posts collection not found: {}", posts_dir.display());
    }
    let registry = Registry::open(posts_dir).context("open posts collection")?;
    contributors(&registry, book_slug)
}

/// Editors, extra contributors and essay authors of one book, deduplicated
/// and sorted by `sortable_name`.
pub fn contributors(registry: &Registry, book_slug: &str) -> anyhow::Result<Vec<ContributorEntry>> {
    let book = registry
        .find_by_slug(book_slug)
        .filter(|id| registry.get(*id).layout() == Some(Layout::Book))
        .with_context(|| format!("no book with slug: {book_slug}"))?;
    let book = registry.get(book);

    let mut uuids = IndexSet::new();
    uuids.extend(book.refs("editors"));
    uuids.extend(book.refs("extra_contributors"));
    for essay in book.refs("essays") {
        match registry.find_by_uuid(&essay) {
            Some(id) => uuids.extend(registry.get(id).refs("authors")),
            None => tracing::warn!(book = %book_slug, uuid = %essay, "essay not found"),
        }
    }

    let mut entries = Vec::with_capacity(uuids.len());
    for uuid in uuids {
        let Some(id) = registry.find_by_uuid(&uuid) else {
            tracing::warn!(book = %book_slug, uuid = %uuid, "contributor not found");
            continue;
        };
        let person = registry.get(id);
        let first_name = person.text("first_name").map(str::to_owned);
        let last_name = person.text("last_name").map(str::to_owned);
        if last_name.is_none() {
            tracing::warn!(path = %person.path.display(), "person doesn't have a last_name field");
        }
        if first_name.is_none() {
            tracing::warn!(path = %person.path.display(), "person doesn't have a first_name field");
        }

        let sortable_name = slugify(&format!(
            "{} {}",
            last_name.as_deref().unwrap_or_default(),
            first_name.as_deref().unwrap_or_default()
        ));
        entries.push(ContributorEntry {
            uuid,
            title: person.title().to_owned(),
            first_name,
            last_name,
            sortable_name,
            permalink: person.text("permalink").map(str::to_owned),
        });
    }

    entries.sort_by(|a, b| a.sortable_name.cmp(&b.sortable_name));
    Ok(entries)
}
