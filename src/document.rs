use std::path::PathBuf;

use anyhow::Context as _;
use indexmap::{IndexMap, IndexSet};

/// Type tag of a document; decides its permalink shape and slug scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    Book,
    Person,
    Essay,
    Page,
    WorkCited,
}

impl Layout {
    pub fn as_str(self) -> &'static str {
        match self {
            Layout::Book => "book",
            Layout::Person => "person",
            Layout::Essay => "essay",
            Layout::Page => "page",
            Layout::WorkCited => "work_cited",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "book" => Some(Layout::Book),
            "person" => Some(Layout::Person),
            "essay" => Some(Layout::Essay),
            "page" => Some(Layout::Page),
            "work_cited" => Some(Layout::WorkCited),
            _ => None,
        }
    }

    /// Slugs of these layouts are prefixed with the owning book's slug.
    pub fn is_book_scoped(self) -> bool {
        matches!(self, Layout::WorkCited | Layout::Page | Layout::Essay)
    }

    /// These layouts always point back at their book.
    pub fn carries_book(self) -> bool {
        matches!(self, Layout::Essay | Layout::Page)
    }
}

/// A front matter value. Relations are stored as the target's UUID.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Text(String),
    List(Vec<String>),
    Set(IndexSet<String>),
    /// Anything loaded from disk that the migration never writes itself.
    Yaml(serde_yaml::Value),
}

impl Value {
    fn is_unset(&self) -> bool {
        matches!(self, Value::Null | Value::Bool(false))
    }

    /// Keep/drop rule applied right before persistence.
    fn survives_pruning(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(flag) => *flag,
            Value::Integer(_) => true,
            Value::Text(text) => !text.trim().is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Set(items) => !items.is_empty(),
            Value::Yaml(value) => yaml_survives_pruning(value),
        }
    }

    fn to_yaml(&self) -> serde_yaml::Value {
        match self {
            Value::Null => serde_yaml::Value::Null,
            Value::Bool(flag) => serde_yaml::Value::Bool(*flag),
            Value::Integer(n) => serde_yaml::Value::Number((*n).into()),
            Value::Text(text) => serde_yaml::Value::String(text.clone()),
            Value::List(items) => strings_to_yaml(items.iter()),
            Value::Set(items) => strings_to_yaml(items.iter()),
            Value::Yaml(value) => value.clone(),
        }
    }

    fn from_yaml(value: serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::Null => Value::Null,
            serde_yaml::Value::Bool(flag) => Value::Bool(flag),
            serde_yaml::Value::Number(n) if n.is_i64() => {
                n.as_i64().map_or(Value::Yaml(serde_yaml::Value::Number(n)), Value::Integer)
            }
            serde_yaml::Value::String(text) => Value::Text(text),
            serde_yaml::Value::Sequence(items) if items.iter().all(|v| v.is_string()) => {
                Value::List(
                    items
                        .into_iter()
                        .filter_map(|v| v.as_str().map(str::to_owned))
                        .collect(),
                )
            }
            other => Value::Yaml(other),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::List(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

fn yaml_survives_pruning(value: &serde_yaml::Value) -> bool {
    match value {
        serde_yaml::Value::Null => false,
        serde_yaml::Value::Bool(flag) => *flag,
        serde_yaml::Value::Number(_) => true,
        serde_yaml::Value::String(text) => !text.trim().is_empty(),
        serde_yaml::Value::Sequence(items) => !items.is_empty(),
        serde_yaml::Value::Mapping(map) => !map.is_empty(),
        serde_yaml::Value::Tagged(_) => true,
    }
}

fn strings_to_yaml<'a>(items: impl Iterator<Item = &'a String>) -> serde_yaml::Value {
    serde_yaml::Value::Sequence(
        items
            .map(|item| serde_yaml::Value::String(item.clone()))
            .collect(),
    )
}

/// How a field is written when the document may already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merge {
    /// Only written when the field is absent, `null` or `false`.
    SetIfAbsent,
    Overwrite,
}

/// Transient marker that never reaches disk.
const SAVE_MARKER: &str = "save";

#[derive(Debug, Clone)]
pub struct Document {
    /// File name inside the collection directory.
    pub path: PathBuf,
    pub data: IndexMap<String, Value>,
    pub content: String,
}

impl Document {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: IndexMap::new(),
            content: String::new(),
        }
    }

    pub fn put(&mut self, key: &str, value: impl Into<Value>, merge: Merge) {
        let value = value.into();
        match merge {
            Merge::Overwrite => {
                self.data.insert(key.to_owned(), value);
            }
            Merge::SetIfAbsent => {
                let absent = self.data.get(key).is_none_or(Value::is_unset);
                if absent {
                    self.data.insert(key.to_owned(), value);
                }
            }
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.data.get(key) {
            Some(Value::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn integer(&self, key: &str) -> Option<i64> {
        match self.data.get(key) {
            Some(Value::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn title(&self) -> &str {
        self.text("title").unwrap_or_default()
    }

    pub fn slug(&self) -> Option<&str> {
        self.text("slug")
    }

    pub fn uuid(&self) -> &str {
        self.text("uuid").unwrap_or_default()
    }

    pub fn layout(&self) -> Option<Layout> {
        self.text("layout").and_then(Layout::parse)
    }

    /// UUIDs referenced by `key`, in stored order.
    pub fn refs(&self, key: &str) -> Vec<String> {
        match self.data.get(key) {
            Some(Value::Text(uuid)) => vec![uuid.clone()],
            Some(Value::List(items)) => items.clone(),
            Some(Value::Set(items)) => items.iter().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// The field as an insertion-ordered set, converting whatever was there
    /// (nothing, a list, a single value) first.
    pub fn set_mut(&mut self, key: &str) -> &mut IndexSet<String> {
        let entry = self.data.entry(key.to_owned()).or_insert(Value::Null);
        if !matches!(entry, Value::Set(_)) {
            let items = match std::mem::replace(entry, Value::Null) {
                Value::List(items) => items.into_iter().collect(),
                Value::Text(item) => IndexSet::from([item]),
                _ => IndexSet::new(),
            };
            *entry = Value::Set(items);
        }
        match entry {
            Value::Set(items) => items,
            _ => unreachable!("entry was just replaced by a set"),
        }
    }

    pub fn insert_ref(&mut self, key: &str, uuid: &str) {
        self.set_mut(key).insert(uuid.to_owned());
    }

    /// Drops unset fields and materializes sets into lists.
    pub fn prune(&mut self) {
        self.data.shift_remove(SAVE_MARKER);
        self.data.retain(|_, value| value.survives_pruning());
        for value in self.data.values_mut() {
            if let Value::Set(items) = value {
                *value = Value::List(std::mem::take(items).into_iter().collect());
            }
        }
    }

    pub fn to_markdown_file(&self) -> anyhow::Result<String> {
        let mut mapping = serde_yaml::Mapping::new();
        for (key, value) in &self.data {
            mapping.insert(serde_yaml::Value::String(key.clone()), value.to_yaml());
        }
        let yaml = serde_yaml::to_string(&mapping).context("serialize front matter")?;
        Ok(format!("---\n{yaml}---\n\n{}\n", self.content))
    }

    pub fn from_markdown_file(path: PathBuf, contents: &str) -> anyhow::Result<Self> {
        let (yaml, body) = split_front_matter(contents)?;
        let mapping: serde_yaml::Mapping = if yaml.trim().is_empty() {
            serde_yaml::Mapping::new()
        } else {
            serde_yaml::from_str(yaml).context("deserialize front matter")?
        };

        let mut data = IndexMap::new();
        for (key, value) in mapping {
            let serde_yaml::Value::String(key) = key else {
                anyhow::bail!("front matter keys must be strings");
            };
            data.insert(key, Value::from_yaml(value));
        }

        Ok(Self {
            path,
            data,
            content: body.to_owned(),
        })
    }
}

fn split_front_matter(contents: &str) -> anyhow::Result<(&str, &str)> {
    let Some(rest) = contents.strip_prefix("---\n") else {
        anyhow::bail!("document must start with YAML front matter ('---')");
    };

    let (yaml, body) = if let Some(body) = rest.strip_prefix("---\n") {
        ("", body)
    } else {
        let end = rest
            .find("\n---\n")
            .ok_or_else(|| anyhow::anyhow!("unterminated front matter"))?;
        (&rest[..=end], &rest[end + "\n---\n".len()..])
    };

    let body = body.strip_prefix('\n').unwrap_or(body);
    let body = body.strip_suffix('\n').unwrap_or(body);
    Ok((yaml, body))
}
