use std::sync::LazyLock;

use regex::Regex;

use crate::document::{Layout, Merge};
use crate::registry::{BookScope, DocId, Registry};
use crate::state::PeopleIndex;
use crate::text::sanitize;

// Only the first connector separates names; later ones may be part of a name.
static CONNECTOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",? (?:and|with) ").expect("valid regex"));
static JUNIOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^j(?:unio)?r\.?$").expect("valid regex"));
// Last names come after the last initial.
static INITIALS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<first>.*\.) (?P<last>.*)$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName {
    pub first: String,
    pub last: String,
}

/// Splits a byline such as `Jane Smith, John Doe Jr., and Mary Lee` into
/// individual names, keeping their order.
pub fn split_names(raw: &str) -> Vec<String> {
    let normalized = sanitize(raw);
    CONNECTOR_RE
        .replacen(&normalized, 1, ",")
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

type NameStrategy = fn(&[&str]) -> Option<PersonName>;

// XXX: Eastern naming order can't be told apart from Western order here.
const NAME_STRATEGIES: &[NameStrategy] = &[two_part_name, initials_name];

/// Decomposes a single name into first and last names. `None` means the
/// name needs a human decision.
pub fn parse_name(name: &str) -> Option<PersonName> {
    let mut parts = name.split_whitespace().collect::<Vec<_>>();
    let junior = match parts.last() {
        Some(last) if parts.len() > 1 && JUNIOR_RE.is_match(last) => parts.pop(),
        _ => None,
    };

    let mut parsed = NAME_STRATEGIES
        .iter()
        .find_map(|strategy| strategy(&parts))?;
    if let Some(junior) = junior {
        parsed.last = format!("{} {junior}", parsed.last);
    }
    Some(parsed)
}

fn two_part_name(parts: &[&str]) -> Option<PersonName> {
    match parts {
        [first, last] => Some(PersonName {
            first: (*first).to_owned(),
            last: (*last).to_owned(),
        }),
        _ => None,
    }
}

fn initials_name(parts: &[&str]) -> Option<PersonName> {
    if !parts.iter().any(|part| part.contains('.')) {
        return None;
    }
    let joined = parts.join(" ");
    let caps = INITIALS_RE.captures(&joined)?;
    let last = caps["last"].trim();
    if last.is_empty() {
        return None;
    }
    Some(PersonName {
        first: caps["first"].to_owned(),
        last: last.to_owned(),
    })
}

/// Finds or creates the person documents named in `raw`, in byline order.
///
/// Every person gains an alternate permalink under `book`. Names that can't
/// be split are still linked, with a warning, unless a previous run or a
/// human already recorded a last name.
pub fn link_people(
    registry: &mut Registry,
    people: &mut PeopleIndex,
    scope: &BookScope,
    book: DocId,
    raw: &str,
) -> Vec<DocId> {
    let book_permalink = registry
        .get(book)
        .text("permalink")
        .unwrap_or_default()
        .to_owned();

    split_names(raw)
        .into_iter()
        .map(|name| {
            let id = match people.get(&name) {
                Some(id) => id,
                None => {
                    let id = registry.create(scope, &name, Layout::Person, None, Some(book));
                    people.insert(&name, id);
                    id
                }
            };

            let person = registry.get_mut(id);
            let alternate = format!(
                "{book_permalink}author/{}/",
                person.slug().unwrap_or_default()
            );
            person.insert_ref("alternate-permalinks", &alternate);

            match parse_name(&name) {
                Some(parsed) => {
                    person.put("first_name", parsed.first, Merge::Overwrite);
                    person.put("last_name", parsed.last, Merge::Overwrite);
                }
                None if person.text("last_name").is_none() => {
                    tracing::warn!(
                        name = %name,
                        path = %person.path.display(),
                        "couldn't detect first and last names for this person; fix manually"
                    );
                }
                None => {}
            }

            id
        })
        .collect()
}
