use crate::entities::decode_entity;

/// Normalizes raw label content into its canonical lookup key: surrounding
/// whitespace trimmed, internal whitespace runs collapsed to one space, and
/// the result case-folded.
pub fn normalize_label(raw: &str) -> String {
    let mut collapsed = String::with_capacity(raw.len());
    let mut last_space = false;
    for c in raw.chars() {
        if c.is_whitespace() {
            if !collapsed.is_empty() && !last_space {
                collapsed.push(' ');
                last_space = true;
            }
            continue;
        }
        last_space = false;
        collapsed.push(c);
    }
    if collapsed.ends_with(' ') {
        collapsed.pop();
    }
    // Lowercasing alone misses the sharp s fold (ß and ẞ both compare equal
    // to "ss" under full case folding).
    let lowered = collapsed.to_lowercase();
    lowered.replace('ß', "ss").replace('ẞ', "ss")
}

/// Resolves backslash escapes and character references in a raw literal.
///
/// A backslash before ASCII punctuation drops the backslash; any other
/// backslash is kept verbatim. An unescaped `&` starts a character reference
/// when one actually parses, and is otherwise literal.
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.char_indices().peekable();
    while let Some((index, c)) = chars.next() {
        match c {
            '\\' => match chars.peek().copied() {
                Some((_, next)) if next.is_ascii_punctuation() => {
                    out.push(next);
                    chars.next();
                }
                _ => out.push('\\'),
            },
            '&' => {
                if let Some((decoded, consumed)) = decode_entity(&raw[index..]) {
                    out.push_str(&decoded);
                    // Skip past the reference; the iterator is still sitting
                    // right after the `&`.
                    while chars
                        .peek()
                        .is_some_and(|&(offset, _)| offset < index + consumed)
                    {
                        chars.next();
                    }
                } else {
                    out.push('&');
                }
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_collapses() {
        assert_eq!(normalize_label("  Foo\t \n Bar  "), "foo bar");
    }

    #[test]
    fn normalize_case_folds() {
        assert_eq!(normalize_label("ТоЛпОй"), "толпой");
        assert_eq!(normalize_label("ẞ"), "ss");
        assert_eq!(normalize_label("Straße"), "strasse");
    }

    #[test]
    fn normalize_whitespace_only_is_empty() {
        assert_eq!(normalize_label(" \t\n "), "");
    }

    #[test]
    fn unescape_drops_backslash_before_punctuation() {
        assert_eq!(unescape("foo\\*bar"), "foo*bar");
        assert_eq!(unescape("\\\\"), "\\");
    }

    #[test]
    fn unescape_keeps_other_backslashes() {
        assert_eq!(unescape("foo\\bar"), "foo\\bar");
        assert_eq!(unescape("trailing\\"), "trailing\\");
    }

    #[test]
    fn unescape_resolves_entities() {
        assert_eq!(unescape("a &amp; b"), "a & b");
        assert_eq!(unescape("&#65;&#x42;"), "AB");
    }

    #[test]
    fn unescape_leaves_invalid_references_alone() {
        assert_eq!(unescape("a & b"), "a & b");
        assert_eq!(unescape("&noSuchEntity;"), "&noSuchEntity;");
    }

    #[test]
    fn escaped_ampersand_is_not_a_reference() {
        assert_eq!(unescape("\\&amp;"), "&amp;");
    }
}
