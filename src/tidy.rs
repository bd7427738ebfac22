use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use scraper::Html;

use crate::text::sanitize;

// An italic run closed by a bold-closing tag: `<i>text1</strong>text2</i>`.
static CROSSED_INLINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<i>(?P<text1>[^<]+)?</strong>(?P<text2>[^<]+)</i>").expect("valid regex")
});
static BRACKETED_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<https?://[^>]+>").expect("valid regex"));
static NEWLINE_AFTER_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?P<tag><[^>]+>)\n+").expect("valid regex"));
// Attribute-less pairs whose content is only whitespace or punctuation. The
// closing name is compared in `unwrap_empty_tags` since `regex` has no
// backreferences.
static EMPTY_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(?P<open>[a-zA-Z][a-zA-Z0-9]*)>(?P<inner>[\s\p{P}]*)</(?P<close>[a-zA-Z][a-zA-Z0-9]*)>")
        .expect("valid regex")
});
// Only inline formatting tags; a paragraph opening with an ellipsis stays put.
static OPENING_TAG_BEFORE_PUNCT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<tag><(?:em|i|strong|b|u|span|small|sup|sub)>)(?P<punct>\.+)")
        .expect("valid regex")
});
static SPACE_BEFORE_PUNCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+(?P<punct>[,.:)!?])").expect("valid regex"));

const MAX_REPAIR_ROUNDS: usize = 16;

/// Cleans a legacy HTML fragment. Running it over its own output is a no-op.
pub fn tidy(html: &str) -> String {
    let repaired = repair_crossed_tags(html);
    let repaired = unescape_bracketed_urls(&repaired);

    let mut current = Html::parse_fragment(&repaired).root_element().inner_html();

    // Moving punctuation can leave an opening tag right before a newline.
    for _ in 0..MAX_REPAIR_ROUNDS {
        let collapsed = NEWLINE_AFTER_TAG_RE.replace_all(&current, "$tag");
        let unwrapped = unwrap_empty_tags(&collapsed);
        let moved = move_punctuation_out_of_tags(&unwrapped);
        if moved == current {
            break;
        }
        current = moved;
    }

    current
}

/// Converts legacy HTML into Markdown. Unknown elements such as `section` or
/// `header` are dropped while their contents are kept.
pub fn to_markdown(html: &str) -> String {
    let tidied = tidy(&sanitize(html));
    let markdown = html2md::parse_html(&tidied);
    fix_punctuation_spacing(markdown.trim()).into_owned()
}

pub fn repair_crossed_tags(html: &str) -> Cow<'_, str> {
    CROSSED_INLINE_RE.replace_all(html, "${text1}</strong> <i>${text2}</i>")
}

/// Drops `<https://…>` outright, leaving only the punctuation around it.
pub fn unescape_bracketed_urls(html: &str) -> Cow<'_, str> {
    BRACKETED_URL_RE.replace_all(html, "")
}

pub fn unwrap_empty_tags(html: &str) -> String {
    let mut current = html.to_owned();
    loop {
        let next = EMPTY_TAG_RE
            .replace_all(&current, |caps: &Captures<'_>| {
                if caps["open"].eq_ignore_ascii_case(&caps["close"]) {
                    caps["inner"].to_owned()
                } else {
                    caps[0].to_owned()
                }
            })
            .into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// `<em>...Title</em>` becomes `... <em>Title</em>`.
pub fn move_punctuation_out_of_tags(html: &str) -> String {
    let mut current = html.to_owned();
    for _ in 0..MAX_REPAIR_ROUNDS {
        let next = OPENING_TAG_BEFORE_PUNCT_RE
            .replace_all(&current, "$punct $tag")
            .into_owned();
        if next == current {
            break;
        }
        current = next;
    }
    current
}

pub fn fix_punctuation_spacing(markdown: &str) -> Cow<'_, str> {
    SPACE_BEFORE_PUNCT_RE.replace_all(markdown, "$punct")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossed_italic_bold_is_split_into_two_runs() {
        assert_eq!(
            repair_crossed_tags("<strong><i>Name</strong> is a writer.</i>"),
            "<strong>Name</strong> <i> is a writer.</i>"
        );
    }

    #[test]
    fn crossed_repair_without_leading_text() {
        assert_eq!(repair_crossed_tags("<i></strong>tail</i>"), "</strong> <i>tail</i>");
    }

    #[test]
    fn bracketed_urls_leave_their_punctuation() {
        assert_eq!(
            unescape_bracketed_urls("see <https://example.org/a>."),
            "see ."
        );
        assert_eq!(unescape_bracketed_urls("<http://x.org>, then"), ", then");
    }

    #[test]
    fn empty_tags_keep_their_punctuation() {
        assert_eq!(unwrap_empty_tags("a<em>, </em>b"), "a, b");
        assert_eq!(unwrap_empty_tags("<b><i></i></b>x"), "x");
        assert_eq!(unwrap_empty_tags("<em>word</em>"), "<em>word</em>");
    }

    #[test]
    fn mismatched_pairs_are_left_alone() {
        assert_eq!(unwrap_empty_tags("<em>.</strong>"), "<em>.</strong>");
    }

    #[test]
    fn punctuation_moves_in_front_of_the_opening_tag() {
        assert_eq!(
            move_punctuation_out_of_tags("<em>..Title</em>"),
            ".. <em>Title</em>"
        );
    }

    #[test]
    fn nested_openers_move_punctuation_up_to_the_block() {
        assert_eq!(
            move_punctuation_out_of_tags("<p><b><em>.x</em></b></p>"),
            "<p>. <b> <em>x</em></b></p>"
        );
    }

    #[test]
    fn tidy_drops_empty_inline_markup() {
        assert_eq!(tidy("<p>Hello <em></em>world</p>"), "<p>Hello world</p>");
    }

    #[test]
    fn tidy_recovers_unclosed_tags() {
        assert_eq!(tidy("<p>one<p>two"), "<p>one</p><p>two</p>");
    }

    #[test]
    fn tidy_is_idempotent() {
        let fragments = [
            "<p>Hello <em></em>world</p>",
            "<p><b><em>.x</em></b> and <i>text1</strong>text2</i></p>",
            "<section>\n<h1>Title</h1>\n<p>see <https://example.org>.</p></section>",
            "<p><i>a</i><b> , </b><span>;</span>done</p>",
            "<div><p>unclosed <em>emphasis</div>",
            "<p><em>.\nx</em></p>",
        ];
        for fragment in fragments {
            let once = tidy(fragment);
            assert_eq!(tidy(&once), once, "fragment: {fragment}");
        }
    }

    #[test]
    fn newline_left_after_a_moved_tag_is_collapsed() {
        assert_eq!(tidy("<p><em>.\nx</em></p>"), "<p>. <em>x</em></p>");
    }

    #[test]
    fn markdown_bypasses_unknown_tags_and_fixes_spacing() {
        assert_eq!(
            to_markdown("<section><header><p>Hello , world .</p></header></section>"),
            "Hello, world."
        );
    }

    #[test]
    fn markdown_keeps_emphasis() {
        assert_eq!(to_markdown("<p><strong>Jane Smith</strong> writes</p>"), "**Jane Smith** writes");
    }
}
