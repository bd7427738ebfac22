/// Collapses the whitespace quirks of hand-authored HTML text into single
/// spaces so that every pattern downstream sees one predictable shape.
pub fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_space = false;

    for ch in input.chars() {
        let ch = match ch {
            '\u{2029}' => continue,
            '\u{00a0}' | '\n' => ' ',
            other => other,
        };

        if ch == ' ' {
            pending_space = true;
            continue;
        }

        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(ch);
    }

    out.trim().to_owned()
}

/// Latin slug: diacritics folded to ASCII, lowercase, every run of other
/// characters replaced by a single dash.
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_dash = false;

    for ch in input.chars() {
        let folded = fold_latin(ch);
        if folded.is_empty() {
            pending_dash = true;
        }
        for c in folded.chars() {
            if c.is_ascii_alphanumeric() {
                if pending_dash && !out.is_empty() {
                    out.push('-');
                }
                pending_dash = false;
                out.push(c.to_ascii_lowercase());
            } else {
                pending_dash = true;
            }
        }
    }

    out
}

/// Slug of the decimal byte sequence of `input`; the fallback for titles with
/// nothing slugifiable in them.
pub fn slugify_bytes(input: &str) -> String {
    let bytes = input
        .bytes()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    slugify(&bytes)
}

fn fold_latin(ch: char) -> String {
    if ch.is_ascii() {
        return ch.to_string();
    }

    let folded = match ch {
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ā' | 'Ă' | 'Ą' => "A",
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'Æ' => "AE",
        'æ' => "ae",
        'Ç' | 'Ć' | 'Č' => "C",
        'ç' | 'ć' | 'č' => "c",
        'Ð' | 'Ď' | 'Đ' => "D",
        'ð' | 'ď' | 'đ' => "d",
        'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ė' | 'Ę' | 'Ě' => "E",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'Ğ' => "G",
        'ğ' => "g",
        'Ì' | 'Í' | 'Î' | 'Ï' | 'Ī' | 'İ' => "I",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'ı' => "i",
        'Ł' => "L",
        'ł' => "l",
        'Ñ' | 'Ń' | 'Ň' => "N",
        'ñ' | 'ń' | 'ň' => "n",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' | 'Ō' | 'Ő' => "O",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'Œ' => "OE",
        'œ' => "oe",
        'Ř' => "R",
        'ř' => "r",
        'Ś' | 'Š' | 'Ş' => "S",
        'ś' | 'š' | 'ş' => "s",
        'ß' => "ss",
        'Ť' | 'Ţ' => "T",
        'ť' | 'ţ' => "t",
        'Þ' => "TH",
        'þ' => "th",
        'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ū' | 'Ů' | 'Ű' => "U",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => "u",
        'Ý' | 'Ÿ' => "Y",
        'ý' | 'ÿ' => "y",
        'Ź' | 'Ż' | 'Ž' => "Z",
        'ź' | 'ż' | 'ž' => "z",
        _ => "",
    };
    folded.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_squeezes_and_trims() {
        assert_eq!(
            sanitize("  Jane\u{00a0}\u{00a0}Smith\n and\u{2029} John  "),
            "Jane Smith and John"
        );
    }

    #[test]
    fn sanitize_keeps_tabs_untouched() {
        assert_eq!(sanitize("a\tb"), "a\tb");
    }

    #[test]
    fn slugify_folds_and_dashes() {
        assert_eq!(slugify("Smith, J. 2000."), "smith-j-2000");
        assert_eq!(slugify("Gabriel García Márquez"), "gabriel-garcia-marquez");
        assert_eq!(slugify("--Keywords for   Comics--"), "keywords-for-comics");
    }

    #[test]
    fn slugify_of_symbols_is_empty() {
        assert_eq!(slugify("…—†"), "");
        assert_eq!(slugify("漢字"), "");
    }

    #[test]
    fn slugify_bytes_is_never_empty_for_non_empty_input() {
        assert_eq!(slugify_bytes("†"), "226-128-160");
    }
}
