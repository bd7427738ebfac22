use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::Context as _;
use chrono::{Datelike as _, NaiveDate};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::citations::{CitationParser, bold_authorship};
use crate::cli::MigrateArgs;
use crate::config::{MIGRATION_MODE, SITE_ENV_VAR, Settings, SiteEnv};
use crate::document::{Layout, Merge};
use crate::matcher::{BioBlock, ContributorMatcher, PersonMatch, embolden_name, extract_bio_name};
use crate::names::link_people;
use crate::registry::{BookScope, DocId, Registry};
use crate::state::RunState;
use crate::text::sanitize;
use crate::tidy::to_markdown;

const LAST_MONTH: u32 = 12;

static COPYRIGHT_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"©\s*(?P<year>\d{4})").expect("valid regex"));
// The HTML title carries the series name and the edition.
static SERIES_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)keywords for ").expect("valid regex"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static COPYRIGHT: LazyLock<Selector> = LazyLock::new(|| selector("#cip"));
static WITH_ID: LazyLock<Selector> = LazyLock::new(|| selector("[id]"));
static SECTION_WITH_ID: LazyLock<Selector> = LazyLock::new(|| selector("section[id]"));
static SECTION_HEADING: LazyLock<Selector> = LazyLock::new(|| selector("h1:first-child"));
static BYLINE: LazyLock<Selector> = LazyLock::new(|| selector("p.au"));
static CHAPTER_MARKER: LazyLock<Selector> = LazyLock::new(|| selector(".cn"));
static FRONT_MATTER_MARKER: LazyLock<Selector> = LazyLock::new(|| selector(".ctfm"));
static PAGE_MARKER: LazyLock<Selector> = LazyLock::new(|| selector(".page"));
static CITATION: LazyLock<Selector> = LazyLock::new(|| selector(".rf, .rff"));
static BIO: LazyLock<Selector> = LazyLock::new(|| selector(".aubio, .aubiof, .aubioft"));
static BIO_NAME: LazyLock<Selector> = LazyLock::new(|| selector(".aubion"));

// In priority order.
const WORKS_CITED_IDS: &[&str] = &["refs", "biblio", "wrk_ctd"];
const CONTRIBUTORS_IDS: &[&str] = &["ab_contrib", "contrib"];

/// Where a migrated page hangs off its book.
#[derive(Debug, Clone, Copy)]
enum BookLink {
    Field(&'static str),
    Pages,
}

#[derive(Debug)]
struct NamedPage {
    label: &'static str,
    section_id: &'static str,
    link: BookLink,
    /// The page's authors are the book's editors.
    editors: bool,
}

const NAMED_PAGES: &[NamedPage] = &[
    NamedPage {
        label: "Introduction",
        section_id: "intro",
        link: BookLink::Field("introduction"),
        editors: true,
    },
    NamedPage {
        label: "Acknowledgments",
        section_id: "acknow",
        link: BookLink::Field("acknowledgments"),
        editors: false,
    },
    NamedPage {
        label: "Appendix",
        section_id: "app",
        link: BookLink::Pages,
        editors: false,
    },
];

/// Counts of what one run touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub books: usize,
    pub essays: usize,
    pub pages: usize,
    pub works_cited: usize,
    pub biographies: usize,
    pub people: usize,
}

/// Entry point for `bookmigrate migrate`; inert outside migration mode.
pub fn run(args: MigrateArgs) -> anyhow::Result<()> {
    let env = SiteEnv::from_env();
    if !env.is_migration() {
        tracing::info!(
            "{SITE_ENV_VAR} is not '{MIGRATION_MODE}'; skipping html migration"
        );
        return Ok(());
    }

    let settings = Settings::resolve(&args).context("resolve settings")?;
    migrate(&settings)?;
    Ok(())
}

/// Migrates every book directory under `settings.html_dir`.
pub fn migrate(settings: &Settings) -> anyhow::Result<MigrationReport> {
    let registry = Registry::open(&settings.posts_dir).context("open posts collection")?;
    let state = RunState::new(&registry);
    let mut migrator = Migrator {
        settings,
        matcher: ContributorMatcher::new(settings.fuzzy_threshold),
        registry,
        state,
        report: MigrationReport::default(),
    };

    for dir in book_dirs(&settings.html_dir)? {
        let source = match read_book(&dir) {
            Ok(Some(source)) => source,
            Ok(None) => continue,
            Err(err) => {
                tracing::warn!(dir = %dir.display(), "{err:#}; skipping book");
                continue;
            }
        };
        migrator
            .migrate_book(source)
            .with_context(|| format!("migrate book: {}", dir.display()))?;
    }

    let people = migrator.state.people.ids();
    for id in &people {
        migrator.registry.save(*id)?;
    }
    migrator.report.people = people.len();

    let report = migrator.report;
    tracing::info!(
        books = report.books,
        essays = report.essays,
        pages = report.pages,
        works_cited = report.works_cited,
        biographies = report.biographies,
        people = report.people,
        "html migration finished"
    );
    Ok(report)
}

fn book_dirs(html_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !html_dir.is_dir() {
        tracing::warn!(dir = %html_dir.display(), "html directory is missing; nothing to migrate");
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for entry in std::fs::read_dir(html_dir)
        .with_context(|| format!("read html directory: {}", html_dir.display()))?
    {
        entries.push(entry?.path());
    }
    entries.sort();

    Ok(entries
        .into_iter()
        .filter(|path| {
            let is_dir = path.is_dir();
            if !is_dir {
                tracing::warn!(path = %path.display(), "not a directory; skipping");
            }
            is_dir
        })
        .collect())
}

/// The files of one book directory, read before anything is written.
struct BookSource {
    slug: String,
    document: Html,
    about: String,
}

/// `Ok(None)` when `dir` has no `index.html`. Both files are decoded lossily.
fn read_book(dir: &Path) -> anyhow::Result<Option<BookSource>> {
    let index = dir.join("index.html");
    if !index.is_file() {
        tracing::warn!(path = %index.display(), "index.html is missing; skipping book");
        return Ok(None);
    }
    let slug = dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let bytes =
        std::fs::read(&index).with_context(|| format!("read book html: {}", index.display()))?;
    let document = Html::parse_document(&String::from_utf8_lossy(&bytes));

    let about_path = dir.join("about.md");
    let about = if about_path.is_file() {
        let bytes = std::fs::read(&about_path)
            .with_context(|| format!("read about page: {}", about_path.display()))?;
        String::from_utf8_lossy(&bytes).into_owned()
    } else {
        String::new()
    };

    Ok(Some(BookSource {
        slug,
        document,
        about,
    }))
}

/// Per-book values every step needs.
#[derive(Debug)]
struct BookContext {
    scope: BookScope,
    book: DocId,
    year: i32,
}

struct Migrator<'s> {
    settings: &'s Settings,
    matcher: ContributorMatcher,
    registry: Registry,
    state: RunState,
    report: MigrationReport,
}

/// Output of one migrated section.
struct SectionRecord {
    id: DocId,
    authors: Vec<DocId>,
}

impl Migrator<'_> {
    fn migrate_book(&mut self, source: BookSource) -> anyhow::Result<()> {
        let BookSource {
            slug,
            document,
            about,
        } = source;

        let year = publication_year(&document);
        let position = self.state.years.register(year, &slug);
        let month = if !self.settings.synthetic_months {
            1
        } else if position > LAST_MONTH {
            tracing::warn!(
                book = %slug,
                year,
                position,
                "more books in one year than months; sharing the last month"
            );
            LAST_MONTH
        } else {
            position
        };
        let date = NaiveDate::from_ymd_opt(year, month, 1)
            .with_context(|| format!("invalid book date: {year}-{month}"))?;
        let scope = BookScope {
            slug: slug.clone(),
            date,
        };

        let description = document
            .select(&TITLE)
            .next()
            .map(element_text)
            .map(|title| SERIES_PREFIX_RE.replace(&title, "").trim().to_owned())
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| title_from_slug(&slug));
        let title = description
            .split(',')
            .next()
            .unwrap_or_default()
            .trim()
            .to_owned();

        let book = self
            .registry
            .create(&scope, &title, Layout::Book, Some(&slug), None);
        {
            let document = self.registry.get_mut(book);
            document.put("description", description.as_str(), Merge::Overwrite);
            document.put("year", i64::from(year), Merge::Overwrite);
            document.content = about.lines().next().unwrap_or_default().to_owned();
        }
        tracing::info!(
            book = %slug,
            title = %title,
            year,
            path = %self.registry.get(book).path.display(),
            "migrating book; remember to pick its color"
        );

        let ctx = BookContext { scope, book, year };

        self.migrate_named_pages(&ctx, &document)?;
        self.migrate_extra_pages(&ctx, &document)?;

        let essay_sections = innermost_sections(&document, &CHAPTER_MARKER);
        match book_works_cited(&document, &essay_sections) {
            Some(container) => self.migrate_works_cited(&ctx, container, None)?,
            None => tracing::warn!(book = %slug, "couldn't find works cited"),
        }
        for section in &essay_sections {
            self.migrate_essay(&ctx, *section)?;
        }

        self.migrate_contributors(&ctx, &document);
        self.ensure_about_page(&ctx, &about)?;
        self.ensure_rights_page(&ctx)?;

        self.registry.save(book)?;
        self.report.books += 1;
        Ok(())
    }

    fn uuid(&self, id: DocId) -> String {
        self.registry.get(id).uuid().to_owned()
    }

    fn uuids(&self, ids: &[DocId]) -> Vec<String> {
        ids.iter().map(|id| self.uuid(*id)).collect()
    }

    fn link_to_book(&mut self, ctx: &BookContext, link: BookLink, id: DocId) {
        let uuid = self.uuid(id);
        let book = self.registry.get_mut(ctx.book);
        match link {
            BookLink::Field(field) => book.put(field, uuid, Merge::Overwrite),
            BookLink::Pages => book.insert_ref("pages", &uuid),
        }
    }

    /// Creates the document for one section: the first-child `h1` is its
    /// title, `.au` paragraphs its authors, and what remains (minus
    /// `removed`) its body.
    fn migrate_section(
        &mut self,
        ctx: &BookContext,
        section: ElementRef<'_>,
        layout: Layout,
        removed: &[ElementRef<'_>],
    ) -> SectionRecord {
        let heading = section.select(&SECTION_HEADING).next();
        let title = heading.map(element_text).unwrap_or_default();
        if heading.is_none() {
            tracing::warn!(
                book = %ctx.scope.slug,
                layout = layout.as_str(),
                "section has no heading; fix its title manually"
            );
        }

        let bylines = section.select(&BYLINE).collect::<Vec<_>>();
        let byline = bylines
            .iter()
            .map(|byline| element_text(*byline))
            .collect::<Vec<_>>()
            .join(", ");

        let id = self
            .registry
            .create(&ctx.scope, &title, layout, None, Some(ctx.book));
        let authors = link_people(
            &mut self.registry,
            &mut self.state.people,
            &ctx.scope,
            ctx.book,
            &byline,
        );

        let book_uuid = self.uuid(ctx.book);
        let uuid = self.uuid(id);
        for author in &authors {
            let person = self.registry.get_mut(*author);
            person.insert_ref("books", &book_uuid);
            person.insert_ref("posts", &uuid);
        }

        let removed = heading
            .into_iter()
            .chain(bylines)
            .chain(removed.iter().copied())
            .collect::<Vec<_>>();
        let body = inner_html_without(section, &removed);

        let author_uuids = self.uuids(&authors);
        let document = self.registry.get_mut(id);
        document.put("authors", author_uuids, Merge::Overwrite);
        document.content = to_markdown(&body);

        tracing::debug!(
            book = %ctx.scope.slug,
            layout = layout.as_str(),
            title = %title,
            authors = authors.len(),
            "migrated section"
        );
        SectionRecord { id, authors }
    }

    fn migrate_named_pages(&mut self, ctx: &BookContext, document: &Html) -> anyhow::Result<()> {
        for page in NAMED_PAGES {
            let Some(section) = document
                .select(&SECTION_WITH_ID)
                .find(|section| section.value().id() == Some(page.section_id))
            else {
                tracing::warn!(book = %ctx.scope.slug, page = page.label, "couldn't find page");
                continue;
            };

            let record = self.migrate_section(ctx, section, Layout::Page, &[]);
            self.link_to_book(ctx, page.link, record.id);
            if page.editors {
                let editors = self.uuids(&record.authors);
                self.registry
                    .get_mut(ctx.book)
                    .put("editors", editors, Merge::Overwrite);
            }
            self.registry.save(record.id)?;
            self.report.pages += 1;
        }
        Ok(())
    }

    fn migrate_extra_pages(&mut self, ctx: &BookContext, document: &Html) -> anyhow::Result<()> {
        for section in innermost_sections(document, &FRONT_MATTER_MARKER) {
            let record = self.migrate_section(ctx, section, Layout::Page, &[]);
            self.link_to_book(ctx, BookLink::Pages, record.id);
            self.registry.save(record.id)?;
            self.report.pages += 1;
        }
        Ok(())
    }

    fn migrate_essay(&mut self, ctx: &BookContext, section: ElementRef<'_>) -> anyhow::Result<()> {
        let page = first_page(section);
        let local_works_cited = find_by_id_within(section, WORKS_CITED_IDS);

        let removed = section
            .select(&CHAPTER_MARKER)
            .chain(local_works_cited)
            .collect::<Vec<_>>();
        let record = self.migrate_section(ctx, section, Layout::Essay, &removed);

        let uuid = self.uuid(record.id);
        self.registry.get_mut(ctx.book).insert_ref("essays", &uuid);

        let essay = self.registry.get_mut(record.id);
        match page {
            Some(page) => essay.put("page", page, Merge::Overwrite),
            None => tracing::warn!(
                book = %ctx.scope.slug,
                essay = %essay.title(),
                "couldn't find the essay's first page"
            ),
        }
        essay.put(
            "availability",
            self.settings.default_availability.clone(),
            Merge::SetIfAbsent,
        );

        if let Some(container) = local_works_cited {
            self.migrate_works_cited(ctx, container, Some(record.id))?;
        }

        self.registry.save(record.id)?;
        self.report.essays += 1;
        Ok(())
    }

    /// Migrates each `.rf`/`.rff` entry of `container` into its own record,
    /// numbered by descending position. Entries belong to `essay` when
    /// given, to the book otherwise.
    fn migrate_works_cited(
        &mut self,
        ctx: &BookContext,
        container: ElementRef<'_>,
        essay: Option<DocId>,
    ) -> anyhow::Result<()> {
        let entries = container.select(&CITATION).collect::<Vec<_>>();
        let total = entries.len();
        let owner = essay.unwrap_or(ctx.book);
        let book_uuid = self.uuid(ctx.book);
        let essay_uuid = essay.map(|essay| self.uuid(essay));

        let mut parser = CitationParser::new();
        for (index, entry) in entries.into_iter().enumerate() {
            let Some(citation) = parser.parse(&element_text(entry)) else {
                continue;
            };

            let id = self.registry.create(
                &ctx.scope,
                &citation.title,
                Layout::WorkCited,
                Some(&citation.slug),
                Some(ctx.book),
            );
            let order = i64::try_from(total - index).unwrap_or(i64::MAX);
            // An essay entry also listed by the book keeps the book's order.
            let order_merge = if essay.is_some()
                && self
                    .registry
                    .get(ctx.book)
                    .refs("works_cited")
                    .iter()
                    .any(|uuid| uuid == self.registry.get(id).uuid())
            {
                Merge::SetIfAbsent
            } else {
                Merge::Overwrite
            };

            let work_cited = self.registry.get_mut(id);
            work_cited.put("order", order, order_merge);
            work_cited.put("authorship", citation.authorship.as_str(), Merge::Overwrite);
            work_cited.put("book", book_uuid.as_str(), Merge::Overwrite);
            if let Some(essay_uuid) = essay_uuid.as_deref() {
                work_cited.put("essay", essay_uuid, Merge::Overwrite);
            }
            work_cited.content =
                bold_authorship(&to_markdown(&entry.inner_html()), &citation.authorship);
            let uuid = work_cited.uuid().to_owned();

            self.registry.get_mut(owner).insert_ref("works_cited", &uuid);
            self.registry.save(id)?;
            self.report.works_cited += 1;
        }

        tracing::debug!(
            book = %ctx.scope.slug,
            entries = total,
            essay = essay.is_some(),
            "migrated works cited"
        );
        Ok(())
    }

    fn migrate_contributors(&mut self, ctx: &BookContext, document: &Html) {
        let Some(container) = find_by_id(document, CONTRIBUTORS_IDS) else {
            tracing::warn!(book = %ctx.scope.slug, "couldn't find contributors section");
            return;
        };

        for bio in container.select(&BIO) {
            let emphasis = bio.select(&BIO_NAME).next();
            let block = BioBlock {
                emphasis: emphasis.map(element_text),
                text: element_text(bio),
            };
            let Some(name) = extract_bio_name(&block) else {
                tracing::warn!(
                    book = %ctx.scope.slug,
                    bio = %block.text,
                    "couldn't find a name in biography; skipping"
                );
                continue;
            };

            let Some(person) = self.resolve_contributor(ctx, &name) else {
                continue;
            };

            let mut html = bio.inner_html();
            if let Some(emphasis) = emphasis {
                html = html.replacen(
                    &emphasis.html(),
                    &format!("<strong>{}</strong>", emphasis.inner_html()),
                    1,
                );
            }
            let mut content = to_markdown(&html);
            if emphasis.is_none() {
                content = embolden_name(&content, &name);
            }
            self.registry.get_mut(person).content = content;
            self.report.biographies += 1;
        }
    }

    /// Exact name, then a close-enough name, then a new person.
    fn resolve_contributor(&mut self, ctx: &BookContext, name: &str) -> Option<DocId> {
        match self.matcher.find(&self.state.people, name) {
            PersonMatch::Exact(id) => Some(id),
            PersonMatch::Fuzzy { id, score } => {
                tracing::warn!(
                    book = %ctx.scope.slug,
                    name = %name,
                    matched = %self.registry.get(id).title(),
                    score,
                    "found similar name; check this is the same person"
                );
                Some(id)
            }
            PersonMatch::Unmatched => {
                tracing::warn!(
                    book = %ctx.scope.slug,
                    name = %name,
                    "creating person profile who isn't linked to any page or essay"
                );
                let people = link_people(
                    &mut self.registry,
                    &mut self.state.people,
                    &ctx.scope,
                    ctx.book,
                    name,
                );
                if people.len() > 1 {
                    tracing::warn!(
                        book = %ctx.scope.slug,
                        name = %name,
                        created = people.len(),
                        "biography name produced more than one person"
                    );
                }
                let person = *people.first()?;

                let uuid = self.uuid(person);
                let book_uuid = self.uuid(ctx.book);
                self.registry
                    .get_mut(ctx.book)
                    .insert_ref("extra_contributors", &uuid);
                self.registry.get_mut(person).insert_ref("books", &book_uuid);
                Some(person)
            }
        }
    }

    fn ensure_about_page(&mut self, ctx: &BookContext, about: &str) -> anyhow::Result<()> {
        if self.registry.get(ctx.book).text("about").is_some() {
            return Ok(());
        }

        let id = self.registry.create(
            &ctx.scope,
            "About this Site",
            Layout::Page,
            Some("about-this-site"),
            Some(ctx.book),
        );
        let editors = self
            .registry
            .get(ctx.book)
            .refs("editors")
            .iter()
            .filter_map(|uuid| self.registry.find_by_uuid(uuid))
            .collect::<Vec<_>>();

        let uuid = self.uuid(id);
        for editor in &editors {
            self.registry.get_mut(*editor).insert_ref("posts", &uuid);
        }
        let editor_uuids = self.uuids(&editors);
        let page = self.registry.get_mut(id);
        page.put("authors", editor_uuids, Merge::Overwrite);
        page.content = about.trim_end().to_owned();
        self.registry
            .get_mut(ctx.book)
            .put("about", uuid, Merge::Overwrite);

        tracing::info!(
            book = %ctx.scope.slug,
            path = %self.registry.get(id).path.display(),
            "created about page"
        );
        self.registry.save(id)?;
        self.report.pages += 1;
        Ok(())
    }

    fn ensure_rights_page(&mut self, ctx: &BookContext) -> anyhow::Result<()> {
        if self.registry.get(ctx.book).text("rights").is_some() {
            return Ok(());
        }

        let id = self.registry.create(
            &ctx.scope,
            "Rights",
            Layout::Page,
            Some("rights-page"),
            Some(ctx.book),
        );
        let content = rights_notice(
            self.registry.get(ctx.book).title(),
            ctx.year,
            &self.settings.rights_holder,
        );
        self.registry.get_mut(id).content = content;

        let uuid = self.uuid(id);
        self.registry
            .get_mut(ctx.book)
            .put("rights", uuid, Merge::Overwrite);

        tracing::info!(
            book = %ctx.scope.slug,
            path = %self.registry.get(id).path.display(),
            "created rights page"
        );
        self.registry.save(id)?;
        self.report.pages += 1;
        Ok(())
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    sanitize(&element.text().collect::<String>())
}

/// Year from the `#cip` copyright notice, or the current year.
fn publication_year(document: &Html) -> i32 {
    document
        .select(&COPYRIGHT)
        .next()
        .map(element_text)
        .and_then(|notice| {
            COPYRIGHT_YEAR_RE
                .captures(&notice)
                .and_then(|caps| caps["year"].parse().ok())
        })
        .unwrap_or_else(|| chrono::Local::now().year())
}

/// `comic-studies` → `Comic Studies`.
fn title_from_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Chapters start on odd pages.
fn first_page(section: ElementRef<'_>) -> Option<i64> {
    let marker = section.select(&PAGE_MARKER).next()?;
    let page = marker
        .value()
        .id()?
        .strip_prefix('p')?
        .parse::<i64>()
        .ok()?;
    Some(if page % 2 == 0 { page + 1 } else { page })
}

fn enclosing_section(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "section")
}

/// The nearest `section` around each `marker`, deduplicated, in document
/// order. Outer sections that merely contain a marked section are skipped.
fn innermost_sections<'a>(document: &'a Html, marker: &Selector) -> Vec<ElementRef<'a>> {
    let mut sections: Vec<ElementRef<'a>> = Vec::new();
    for element in document.select(marker) {
        let Some(section) = enclosing_section(element) else {
            continue;
        };
        if !sections.iter().any(|seen| same_element(*seen, section)) {
            sections.push(section);
        }
    }
    sections
}

fn same_element(a: ElementRef<'_>, b: ElementRef<'_>) -> bool {
    std::ptr::eq(a.value(), b.value())
}

fn is_inside_any(element: ElementRef<'_>, sections: &[ElementRef<'_>]) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| sections.iter().any(|section| same_element(ancestor, *section)))
}

/// The first element carrying one of `ids`, trying them in order.
fn find_by_id<'a>(document: &'a Html, ids: &[&str]) -> Option<ElementRef<'a>> {
    ids.iter().find_map(|id| {
        document
            .select(&WITH_ID)
            .find(|element| element.value().id() == Some(*id))
    })
}

fn find_by_id_within<'a>(root: ElementRef<'a>, ids: &[&str]) -> Option<ElementRef<'a>> {
    ids.iter().find_map(|id| {
        root.select(&WITH_ID)
            .find(|element| element.value().id() == Some(*id))
    })
}

/// Book-level works cited: the first container that is not an essay's own.
fn book_works_cited<'a>(document: &'a Html, essays: &[ElementRef<'a>]) -> Option<ElementRef<'a>> {
    WORKS_CITED_IDS.iter().find_map(|id| {
        document.select(&WITH_ID).find(|element| {
            element.value().id() == Some(*id) && !is_inside_any(*element, essays)
        })
    })
}

/// Serialized children of `root` with each of `removed` cut out.
fn inner_html_without(root: ElementRef<'_>, removed: &[ElementRef<'_>]) -> String {
    let mut html = root.inner_html();
    for element in removed {
        html = html.replacen(&element.html(), "", 1);
    }
    html
}

fn rights_notice(title: &str, year: i32, holder: &str) -> String {
    format!(
        "_Keywords for {title}_ is © {year} by {holder}. Material on this website is licensed \
         under a [Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International \
         License](http://creativecommons.org/licenses/by-nc-nd/4.0/).\n\n\
         [![Creative Commons License](https://licensebuttons.net/l/by-nc-nd/4.0/88x31.png)]\
         (http://creativecommons.org/licenses/by-nc-nd/4.0/)"
    )
}
