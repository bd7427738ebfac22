use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::NaiveDate;

use crate::document::{Document, Layout, Merge};
use crate::text::{sanitize, slugify, slugify_bytes};

/// Handle to a document held by a [`Registry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocId(usize);

/// The book every document created during one book's migration belongs to.
#[derive(Debug, Clone)]
pub struct BookScope {
    pub slug: String,
    /// Publication year plus the book's synthetic month.
    pub date: NaiveDate,
}

/// Find-or-create for every document in the posts collection.
#[derive(Debug)]
pub struct Registry {
    dir: PathBuf,
    documents: Vec<Document>,
    by_slug: HashMap<String, DocId>,
    by_uuid: HashMap<String, DocId>,
}

impl Registry {
    /// Opens (creating if needed) the collection directory and loads every
    /// document in it. Nothing is written by a failed open.
    pub fn open(dir: &Path) -> anyhow::Result<Self> {
        if dir.exists() && !dir.is_dir() {
            anyhow::bail!("posts collection is not a directory: {}", dir.display());
        }
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create posts collection: {}", dir.display()))?;

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("read posts collection: {}", dir.display()))?
        {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            paths.push(path);
        }
        paths.sort();

        let mut registry = Self {
            dir: dir.to_path_buf(),
            documents: Vec::new(),
            by_slug: HashMap::new(),
            by_uuid: HashMap::new(),
        };

        for path in paths {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("read document: {}", path.display()))?;
            let file_name = PathBuf::from(path.file_name().unwrap_or_default());
            let document = Document::from_markdown_file(file_name, &contents)
                .with_context(|| format!("parse document: {}", path.display()))?;
            registry.insert(document);
        }

        tracing::debug!(
            dir = %dir.display(),
            documents = registry.documents.len(),
            "loaded posts collection"
        );
        Ok(registry)
    }

    fn insert(&mut self, document: Document) -> DocId {
        let id = DocId(self.documents.len());
        let slug = document
            .slug()
            .map(str::to_owned)
            .unwrap_or_else(|| slug_from_file_name(&document.path));
        if let Some(previous) = self.by_slug.insert(slug.clone(), id) {
            tracing::warn!(
                slug = %slug,
                kept = %document.path.display(),
                shadowed = %self.documents[previous.0].path.display(),
                "two documents share a slug; fix manually"
            );
        }
        if !document.uuid().is_empty() {
            self.by_uuid.insert(document.uuid().to_owned(), id);
        }
        self.documents.push(document);
        id
    }

    pub fn get(&self, id: DocId) -> &Document {
        &self.documents[id.0]
    }

    pub fn get_mut(&mut self, id: DocId) -> &mut Document {
        &mut self.documents[id.0]
    }

    pub fn find_by_slug(&self, slug: &str) -> Option<DocId> {
        self.by_slug.get(slug).copied()
    }

    pub fn find_by_uuid(&self, uuid: &str) -> Option<DocId> {
        self.by_uuid.get(uuid).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = DocId> + '_ {
        (0..self.documents.len()).map(DocId)
    }

    pub fn with_layout(&self, layout: Layout) -> Vec<DocId> {
        self.ids()
            .filter(|id| self.get(*id).layout() == Some(layout))
            .collect()
    }

    /// Finds or creates the document for `(title, layout)` inside `scope`.
    ///
    /// `permalink`, `uuid` and `slug` are only written the first time;
    /// `title`, `layout` and the book reference are rewritten on every call.
    pub fn create(
        &mut self,
        scope: &BookScope,
        title: &str,
        layout: Layout,
        slug: Option<&str>,
        book: Option<DocId>,
    ) -> DocId {
        let title = sanitize(title);
        let mut original_slug = slug.map(str::to_owned).unwrap_or_else(|| slugify(&title));
        let slug_was_empty = original_slug.is_empty();
        if slug_was_empty {
            original_slug = slugify_bytes(&title);
        }
        if original_slug.is_empty() {
            original_slug = "untitled".to_owned();
        }

        let slug = if layout.is_book_scoped() {
            format!("{}-{original_slug}", scope.slug)
        } else {
            original_slug.clone()
        };

        let id = match self.find_by_slug(&slug) {
            Some(id) => id,
            None => {
                let path = PathBuf::from(format!("{}-{slug}.md", scope.date.format("%Y-%m-%d")));
                self.insert(Document::new(path))
            }
        };

        let permalink = match layout {
            Layout::Book => format!("/{original_slug}/"),
            Layout::Person => format!("/author/{original_slug}/"),
            Layout::Essay => format!("/{}/essay/{original_slug}/", scope.slug),
            Layout::WorkCited => format!("/{}/works_cited/{original_slug}/", scope.slug),
            Layout::Page => format!("/{}/{original_slug}/", scope.slug),
        };
        let book_uuid = book.map(|b| self.get(b).uuid().to_owned());

        let document = self.get_mut(id);
        document.put("title", title.as_str(), Merge::Overwrite);
        document.put("layout", layout.as_str(), Merge::Overwrite);
        document.put("uuid", uuid::Uuid::new_v4().to_string(), Merge::SetIfAbsent);
        document.put("slug", slug.as_str(), Merge::SetIfAbsent);
        document.put("permalink", permalink, Merge::SetIfAbsent);
        if layout.carries_book() {
            document.put("book", book_uuid, Merge::Overwrite);
        }

        let uuid = document.uuid().to_owned();
        let path = document.path.clone();
        self.by_uuid.insert(uuid, id);

        if slug_was_empty {
            tracing::warn!(
                title = %title,
                path = %path.display(),
                "prevented empty post name; the title is empty or has no alphabetic characters"
            );
        }

        id
    }

    /// Prunes and writes one document.
    pub fn save(&mut self, id: DocId) -> anyhow::Result<()> {
        let document = self.get_mut(id);
        document.prune();
        let contents = document.to_markdown_file()?;
        let path = self.dir.join(&self.documents[id.0].path);

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("open document: {}", path.display()))?;
        file.write_all(contents.as_bytes())
            .with_context(|| format!("write document: {}", path.display()))?;
        file.flush()
            .with_context(|| format!("flush document: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "saved document");
        Ok(())
    }
}

/// `2020-01-01-some-slug.md` → `some-slug`.
fn slug_from_file_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let bytes = stem.as_bytes();
    let has_date = bytes.len() > 11
        && bytes[..10]
            .iter()
            .enumerate()
            .all(|(i, b)| if i == 4 || i == 7 { *b == b'-' } else { b.is_ascii_digit() })
        && bytes[10] == b'-';
    if has_date {
        stem[11..].to_owned()
    } else {
        stem.to_owned()
    }
}
