use std::sync::LazyLock;

use regex::Regex;

use crate::registry::DocId;
use crate::state::PeopleIndex;
use crate::text::sanitize;

pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.9;

// Where the name ends in a bio without an emphasized name span.
static NAME_BOUNDARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?: (?:is|holds|has)|,|’s) |—Research| \(@").expect("valid regex")
});
static HONORIFIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^dr\.\s+").expect("valid regex"));

/// What a biography block offers for finding its subject's name.
#[derive(Debug, Clone, Default)]
pub struct BioBlock {
    /// Text of the `.aubion` span, when the bio has one.
    pub emphasis: Option<String>,
    pub text: String,
}

type NameSource = fn(&BioBlock) -> Option<String>;

const NAME_SOURCES: &[NameSource] = &[emphasized_name, boundary_name];

/// The bio's author name, or `None` when no strategy yields one.
pub fn extract_bio_name(bio: &BioBlock) -> Option<String> {
    let name = NAME_SOURCES.iter().find_map(|source| source(bio))?;
    let name = sanitize(&name);
    let name = HONORIFIC_RE.replace(&name, "").trim().to_owned();
    (!name.is_empty()).then_some(name)
}

fn emphasized_name(bio: &BioBlock) -> Option<String> {
    let emphasis = bio.emphasis.as_deref()?;
    let name = emphasis.split(',').next()?.trim();
    (!name.is_empty()).then(|| name.to_owned())
}

fn boundary_name(bio: &BioBlock) -> Option<String> {
    let text = sanitize(&bio.text);
    let name = NAME_BOUNDARY_RE.splitn(&text, 2).next()?.trim();
    (!name.is_empty()).then(|| name.to_owned())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PersonMatch {
    Exact(DocId),
    /// Similar enough to be linked; needs a human check.
    Fuzzy { id: DocId, score: f64 },
    Unmatched,
}

/// Links biography names to known people: exact title first, then
/// Jaro-Winkler similarity above a threshold.
#[derive(Debug, Clone, Copy)]
pub struct ContributorMatcher {
    threshold: f64,
}

impl Default for ContributorMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_FUZZY_THRESHOLD)
    }
}

impl ContributorMatcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// The threshold is exclusive.
    pub fn accepts(&self, score: f64) -> bool {
        score > self.threshold
    }

    pub fn find(&self, people: &PeopleIndex, name: &str) -> PersonMatch {
        if let Some(id) = people.get(name) {
            return PersonMatch::Exact(id);
        }

        let best = people
            .iter()
            .map(|(known, id)| (similarity(known, name), id))
            .max_by(|a, b| a.0.total_cmp(&b.0));

        match best {
            Some((score, id)) if self.accepts(score) => PersonMatch::Fuzzy { id, score },
            _ => PersonMatch::Unmatched,
        }
    }
}

/// Case-insensitive Jaro-Winkler similarity in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::jaro_winkler(&a.to_lowercase(), &b.to_lowercase())
}

/// Bolds the leading name run of a converted bio unless it already starts
/// emphasized.
pub fn embolden_name(markdown: &str, name: &str) -> String {
    if name.is_empty() || markdown.starts_with("**") || markdown.starts_with("__") {
        return markdown.to_owned();
    }
    let first_line_end = markdown.find('\n').unwrap_or(markdown.len());
    let Some(start) = markdown[..first_line_end].rfind(name) else {
        return markdown.to_owned();
    };
    let end = start + name.len();
    format!("**{}**{}", &markdown[..end], &markdown[end..])
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::document::Layout;
    use crate::registry::{BookScope, Registry};

    fn bio(emphasis: Option<&str>, text: &str) -> BioBlock {
        BioBlock {
            emphasis: emphasis.map(str::to_owned),
            text: text.to_owned(),
        }
    }

    #[test]
    fn emphasized_name_wins() {
        let b = bio(Some("Jane Smith, PhD"), "Jane Smith, PhD, is a professor.");
        assert_eq!(extract_bio_name(&b).as_deref(), Some("Jane Smith"));
    }

    #[test]
    fn boundary_phrases_split_the_name() {
        for (text, expected) in [
            ("Jane Smith is a professor.", "Jane Smith"),
            ("Jane Smith holds a chair.", "Jane Smith"),
            ("Jane Smith has written.", "Jane Smith"),
            ("Jane Smith, professor of media.", "Jane Smith"),
            ("Jane Smith’s research covers comics.", "Jane Smith"),
            ("Jane Smith—Research fellow.", "Jane Smith"),
            ("Jane Smith (@jsmith) writes.", "Jane Smith"),
        ] {
            assert_eq!(extract_bio_name(&bio(None, text)).as_deref(), Some(expected), "{text}");
        }
    }

    #[test]
    fn honorific_is_removed() {
        let b = bio(None, "Dr. Jane Smith is a professor.");
        assert_eq!(extract_bio_name(&b).as_deref(), Some("Jane Smith"));
    }

    #[test]
    fn empty_bio_has_no_name() {
        assert_eq!(extract_bio_name(&bio(None, "  ")), None);
    }

    #[test]
    fn threshold_is_exclusive() {
        let matcher = ContributorMatcher::new(0.9);
        assert!(!matcher.accepts(0.9));
        assert!(matcher.accepts(0.95));
    }

    #[test]
    fn similarity_ignores_case() {
        assert!((similarity("JANE SMITH", "jane smith") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn exact_then_fuzzy_then_unmatched() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let mut registry = Registry::open(temp.path())?;
        let scope = BookScope {
            slug: "comics".to_owned(),
            date: chrono::NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date"),
        };
        let jane = registry.create(&scope, "Jane Smithson", Layout::Person, None, None);
        let mut people = PeopleIndex::default();
        people.insert("Jane Smithson", jane);

        let matcher = ContributorMatcher::default();
        assert_eq!(matcher.find(&people, "Jane Smithson"), PersonMatch::Exact(jane));
        match matcher.find(&people, "Jane Smithsen") {
            PersonMatch::Fuzzy { id, score } => {
                assert_eq!(id, jane);
                assert!(score > 0.9);
            }
            other => panic!("expected fuzzy match, got {other:?}"),
        }
        assert_eq!(matcher.find(&people, "Bob Lee"), PersonMatch::Unmatched);
        assert_eq!(
            matcher.find(&PeopleIndex::default(), "Bob Lee"),
            PersonMatch::Unmatched
        );
        Ok(())
    }

    #[test]
    fn embolden_leading_name() {
        assert_eq!(
            embolden_name("Jane Smith is a professor.", "Jane Smith"),
            "**Jane Smith** is a professor."
        );
        assert_eq!(
            embolden_name("**Jane Smith** is a professor.", "Jane Smith"),
            "**Jane Smith** is a professor."
        );
        assert_eq!(embolden_name("Someone else.", "Jane Smith"), "Someone else.");
    }
}
