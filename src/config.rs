use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

use crate::cli::{ContributorsArgs, MigrateArgs};

pub const SITE_ENV_VAR: &str = "SITE_ENV";
pub const MIGRATION_MODE: &str = "html-migration";

/// The site build environment. Migration only happens in one explicit mode.
#[derive(Debug, Clone, Default)]
pub struct SiteEnv {
    value: Option<String>,
}

impl SiteEnv {
    pub fn from_env() -> Self {
        Self::new(std::env::var(SITE_ENV_VAR).ok())
    }

    pub fn new(value: Option<String>) -> Self {
        Self { value }
    }

    pub fn is_migration(&self) -> bool {
        self.value.as_deref() == Some(MIGRATION_MODE)
    }

    /// Site-build hooks stay off in any migration-like environment.
    pub fn suppresses_site_hooks(&self) -> bool {
        self.value
            .as_deref()
            .is_some_and(|value| value.contains("migration"))
    }
}

/// The parts of `_config.yml` the migration reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub default_availability: Option<String>,
}

impl SiteConfig {
    /// A missing file means defaults.
    pub fn load(site: &Path) -> anyhow::Result<Self> {
        let path = site.join("_config.yml");
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no site config; using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("read site config: {}", path.display()))?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents)
            .with_context(|| format!("parse site config: {}", path.display()))
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub html_dir: PathBuf,
    pub posts_dir: PathBuf,
    pub fuzzy_threshold: f64,
    /// Order books within a year by a synthetic month; otherwise every book
    /// is dated January.
    pub synthetic_months: bool,
    pub rights_holder: String,
    pub default_availability: Option<String>,
}

impl Settings {
    pub fn resolve(args: &MigrateArgs) -> anyhow::Result<Self> {
        let site = PathBuf::from(&args.site);
        let config = SiteConfig::load(&site)?;

        if !(0.0..=1.0).contains(&args.fuzzy_threshold) {
            anyhow::bail!(
                "fuzzy threshold must be between 0 and 1, got {}",
                args.fuzzy_threshold
            );
        }

        Ok(Self {
            html_dir: args
                .html
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or_else(|| site.join("_html")),
            posts_dir: posts_dir(&site, args.posts.as_deref()),
            fuzzy_threshold: args.fuzzy_threshold,
            synthetic_months: !args.no_synthetic_months,
            rights_holder: args.rights_holder.clone(),
            default_availability: config.default_availability,
        })
    }
}

pub fn contributors_posts_dir(args: &ContributorsArgs) -> PathBuf {
    posts_dir(Path::new(&args.site), args.posts.as_deref())
}

fn posts_dir(site: &Path, explicit: Option<&str>) -> PathBuf {
    explicit
        .map(PathBuf::from)
        .unwrap_or_else(|| site.join("_posts"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn migrate_args(site: &Path) -> MigrateArgs {
        MigrateArgs {
            site: site.display().to_string(),
            html: None,
            posts: None,
            fuzzy_threshold: 0.9,
            no_synthetic_months: false,
            rights_holder: "New York University".to_owned(),
        }
    }

    #[test]
    fn only_the_exact_mode_migrates() {
        assert!(SiteEnv::new(Some("html-migration".to_owned())).is_migration());
        assert!(!SiteEnv::new(Some("production".to_owned())).is_migration());
        assert!(!SiteEnv::new(Some("html-migration-dry".to_owned())).is_migration());
        assert!(!SiteEnv::default().is_migration());
    }

    #[test]
    fn any_migration_mode_suppresses_site_hooks() {
        assert!(SiteEnv::new(Some("html-migration".to_owned())).suppresses_site_hooks());
        assert!(SiteEnv::new(Some("data-migration".to_owned())).suppresses_site_hooks());
        assert!(!SiteEnv::new(Some("production".to_owned())).suppresses_site_hooks());
        assert!(!SiteEnv::default().suppresses_site_hooks());
    }

    #[test]
    fn defaults_live_under_the_site() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let settings = Settings::resolve(&migrate_args(temp.path()))?;
        assert_eq!(settings.html_dir, temp.path().join("_html"));
        assert_eq!(settings.posts_dir, temp.path().join("_posts"));
        assert!(settings.synthetic_months);
        assert_eq!(settings.default_availability, None);
        Ok(())
    }

    #[test]
    fn availability_comes_from_site_config() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        std::fs::write(
            temp.path().join("_config.yml"),
            "title: Keywords\ndefault_availability: print\nbook_layouts: [book]\n",
        )?;
        let settings = Settings::resolve(&migrate_args(temp.path()))?;
        assert_eq!(settings.default_availability.as_deref(), Some("print"));
        Ok(())
    }

    #[test]
    fn out_of_range_threshold_is_rejected() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let mut args = migrate_args(temp.path());
        args.fuzzy_threshold = 1.5;
        assert!(Settings::resolve(&args).is_err());
        Ok(())
    }
}
