use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::text::{sanitize, slugify};

// slug: authors + year
// authorship: anything non-numeric up to the editor role or the year
// year: 2000, 2000a, 2000-01, (2000) 2001, (2000, 2001) 2002, n.d., n.d.-a.,
// forthcoming; all optionally after "ed.", "eds." or "dir."
static WORK_CITED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?P<slug>(?P<authorship>[^0-9]+)(?:,? (?:eds?|dir))?[.:]”?(?:(?:,? ?\(?\d{4}(?:[-–0-9a-z]+)?\)?)+\.| ?n\.d\.(?:-[a-z]\.)?| ?forthcoming\.))",
    )
    .expect("valid regex")
});
static EDITOR_ROLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",? (?:eds?|dir)$").expect("valid regex"));
// "Same author as above": a dash or underscore run followed by punctuation.
static DASHES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-_—–]+(?P<punct>[,.])").expect("valid regex"));
// Same marker after Markdown conversion, which may escape it.
static ESCAPED_DASHES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\\?[-_—–])+(?P<punct>[,.])").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    /// Full normalized citation, dash marker replaced.
    pub title: String,
    /// Authors plus year, as matched.
    pub slug_span: String,
    pub authorship: String,
    /// Slug of `slug_span`; unique per book.
    pub slug: String,
}

/// Parses the entries of one works-cited block in document order, carrying
/// the previous authorship for dash markers.
#[derive(Debug, Default)]
pub struct CitationParser {
    previous_authorship: Option<String>,
}

impl CitationParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` when the entry needs manual work; a warning has been logged.
    pub fn parse(&mut self, text: &str) -> Option<Citation> {
        let mut title = sanitize(text);
        if let Some(previous) = self.previous_authorship.as_deref()
            && DASHES_RE.is_match(&title)
        {
            title = DASHES_RE
                .replace(&title, |caps: &Captures<'_>| format!("{previous}{}", &caps["punct"]))
                .into_owned();
        }

        let Some(caps) = WORK_CITED_RE.captures(&title) else {
            tracing::warn!(citation = %title, "couldn't process work cited");
            return None;
        };
        let slug_span = caps["slug"].to_owned();
        if slug_span == title {
            tracing::warn!(citation = %title, "couldn't process work cited; nothing besides authors and year");
            return None;
        }

        let authorship = EDITOR_ROLE_RE
            .replace(caps["authorship"].trim(), "")
            .into_owned();
        let slug = slugify(&slug_span);
        if slug.is_empty() {
            tracing::warn!(citation = %title, "couldn't process work cited; empty slug");
            return None;
        }

        self.previous_authorship = Some(authorship.clone());
        Some(Citation {
            title,
            slug_span,
            authorship,
            slug,
        })
    }
}

/// Restores the authorship over a leading dash marker and bolds it.
pub fn bold_authorship(markdown: &str, authorship: &str) -> String {
    if authorship.is_empty() {
        return markdown.to_owned();
    }
    let restored = ESCAPED_DASHES_RE
        .replace(markdown, |caps: &Captures<'_>| format!("{authorship}{}", &caps["punct"]))
        .into_owned();
    match restored.strip_prefix(authorship) {
        Some(rest) => format!("**{authorship}**{rest}"),
        None => restored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_year() {
        let mut parser = CitationParser::new();
        let c = parser.parse("Smith, J. 2000. Title.").expect("citation");
        assert_eq!(c.slug_span, "Smith, J. 2000.");
        assert_eq!(c.authorship, "Smith, J");
        assert_eq!(c.slug, "smith-j-2000");
    }

    #[test]
    fn editor_marker_and_parenthetical_years() {
        let mut parser = CitationParser::new();
        let c = parser
            .parse("Smith, J., ed. (2000) 2001. Title.")
            .expect("citation");
        assert_eq!(c.authorship, "Smith, J.");
        assert_eq!(c.slug_span, "Smith, J., ed. (2000) 2001.");
        assert_eq!(c.slug, "smith-j-ed-2000-2001");
    }

    #[test]
    fn year_ranges_and_suffixes() {
        let mut parser = CitationParser::new();
        let c = parser.parse("Doe, Jane. 1998–99a. Title.").expect("citation");
        assert_eq!(c.slug_span, "Doe, Jane. 1998–99a.");
        let c = parser.parse("Doe, Jane. (1990, 1991) 2002. Title.").expect("citation");
        assert_eq!(c.slug_span, "Doe, Jane. (1990, 1991) 2002.");
    }

    #[test]
    fn undated_and_forthcoming() {
        let mut parser = CitationParser::new();
        let c = parser.parse("Smith, J. n.d.-a. Title.").expect("citation");
        assert_eq!(c.slug_span, "Smith, J. n.d.-a.");
        assert_eq!(c.authorship, "Smith, J");
        let c = parser.parse("Lee, Mary. Forthcoming. Title.").expect("citation");
        assert_eq!(c.slug, "lee-mary-forthcoming");
    }

    #[test]
    fn director_marker() {
        let mut parser = CitationParser::new();
        let c = parser.parse("Lynch, David, dir. 1986. Blue Velvet.").expect("citation");
        assert_eq!(c.authorship, "Lynch, David");
    }

    #[test]
    fn dash_marker_reuses_previous_authorship() {
        let mut parser = CitationParser::new();
        parser.parse("Smith, J. 2000. First.").expect("first");
        let c = parser.parse("———. 2001. Second.").expect("second");
        assert_eq!(c.title, "Smith, J. 2001. Second.");
        assert_eq!(c.slug, "smith-j-2001");
    }

    #[test]
    fn dash_marker_without_previous_entry_is_kept_verbatim() {
        let mut parser = CitationParser::new();
        let c = parser.parse("———. 2001. Second.").expect("citation");
        assert_eq!(c.title, "———. 2001. Second.");
        assert_eq!(c.slug, "2001");
    }

    #[test]
    fn unmatched_and_degenerate_entries_are_skipped() {
        let mut parser = CitationParser::new();
        assert_eq!(parser.parse("Untitled pamphlet"), None);
        assert_eq!(parser.parse("Smith, J. 2000."), None);
    }

    #[test]
    fn bold_authorship_restores_dashes() {
        assert_eq!(
            bold_authorship("\\-\\-\\-. 2001. *Second*.", "Smith, J"),
            "**Smith, J**. 2001. *Second*."
        );
        assert_eq!(
            bold_authorship("Smith, J. 2000. *Title*.", "Smith, J"),
            "**Smith, J**. 2000. *Title*."
        );
        assert_eq!(bold_authorship("Other text", "Smith, J"), "Other text");
    }
}
