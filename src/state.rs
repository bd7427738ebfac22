use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::document::Layout;
use crate::registry::{DocId, Registry};

/// Books seen per publication year, in processing order. A book's position
/// is used as a synthetic month so books from one year sort stably.
#[derive(Debug, Default)]
pub struct YearIndex {
    years: BTreeMap<i32, Vec<String>>,
}

impl YearIndex {
    /// 1-based position of `book_slug` among the books of `year`.
    pub fn register(&mut self, year: i32, book_slug: &str) -> u32 {
        let books = self.years.entry(year).or_default();
        let position = match books.iter().position(|slug| slug == book_slug) {
            Some(position) => position,
            None => {
                books.push(book_slug.to_owned());
                books.len() - 1
            }
        };
        u32::try_from(position + 1).unwrap_or(u32::MAX)
    }

    #[cfg(test)]
    fn books(&self, year: i32) -> &[String] {
        self.years.get(&year).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Person documents by exact title, shared across every book of a run.
#[derive(Debug, Default)]
pub struct PeopleIndex {
    by_name: IndexMap<String, DocId>,
}

impl PeopleIndex {
    /// Seeds the index with the person documents already on disk.
    pub fn from_registry(registry: &Registry) -> Self {
        let mut index = Self::default();
        for id in registry.with_layout(Layout::Person) {
            let title = registry.get(id).title();
            if !title.is_empty() {
                index.by_name.insert(title.to_owned(), id);
            }
        }
        index
    }

    pub fn get(&self, name: &str) -> Option<DocId> {
        self.by_name.get(name).copied()
    }

    pub fn insert(&mut self, name: &str, id: DocId) {
        self.by_name.insert(name.to_owned(), id);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, DocId)> + '_ {
        self.by_name.iter().map(|(name, id)| (name.as_str(), *id))
    }

    pub fn ids(&self) -> Vec<DocId> {
        self.by_name.values().copied().collect()
    }
}

/// Process-scoped state shared by every book of one migration run.
#[derive(Debug, Default)]
pub struct RunState {
    pub years: YearIndex,
    pub people: PeopleIndex,
}

impl RunState {
    pub fn new(registry: &Registry) -> Self {
        Self {
            years: YearIndex::default(),
            people: PeopleIndex::from_registry(registry),
        }
    }
}
