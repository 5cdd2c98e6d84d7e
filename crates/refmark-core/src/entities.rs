use once_cell::sync::Lazy;
use std::collections::HashMap;

// Subset of the HTML5 named references that shows up in real documents.
// Lookup is case-sensitive, as in the HTML5 list.
static NAMED_ENTITIES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("AElig", "\u{C6}"),
        ("AMP", "&"),
        ("Aacute", "\u{C1}"),
        ("Auml", "\u{C4}"),
        ("COPY", "\u{A9}"),
        ("Dagger", "\u{2021}"),
        ("GT", ">"),
        ("LT", "<"),
        ("Ouml", "\u{D6}"),
        ("QUOT", "\""),
        ("Uuml", "\u{DC}"),
        ("aacute", "\u{E1}"),
        ("aelig", "\u{E6}"),
        ("agrave", "\u{E0}"),
        ("amp", "&"),
        ("apos", "'"),
        ("auml", "\u{E4}"),
        ("bull", "\u{2022}"),
        ("ccedil", "\u{E7}"),
        ("cent", "\u{A2}"),
        ("copy", "\u{A9}"),
        ("dagger", "\u{2020}"),
        ("deg", "\u{B0}"),
        ("eacute", "\u{E9}"),
        ("egrave", "\u{E8}"),
        ("euro", "\u{20AC}"),
        ("frac12", "\u{BD}"),
        ("gt", ">"),
        ("hellip", "\u{2026}"),
        ("laquo", "\u{AB}"),
        ("ldquo", "\u{201C}"),
        ("lsquo", "\u{2018}"),
        ("lt", "<"),
        ("mdash", "\u{2014}"),
        ("middot", "\u{B7}"),
        ("nbsp", "\u{A0}"),
        ("ndash", "\u{2013}"),
        ("ntilde", "\u{F1}"),
        ("ouml", "\u{F6}"),
        ("para", "\u{B6}"),
        ("pound", "\u{A3}"),
        ("quot", "\""),
        ("raquo", "\u{BB}"),
        ("rdquo", "\u{201D}"),
        ("reg", "\u{AE}"),
        ("rsquo", "\u{2019}"),
        ("sect", "\u{A7}"),
        ("szlig", "\u{DF}"),
        ("times", "\u{D7}"),
        ("trade", "\u{2122}"),
        ("uuml", "\u{FC}"),
        ("yen", "\u{A5}"),
    ])
});

pub(crate) fn lookup_named_entity(name: &str) -> Option<&'static str> {
    NAMED_ENTITIES.get(name).copied()
}

/// Decodes a character reference at the start of `text`, which must begin with
/// `&`. Returns the replacement text and the number of bytes consumed,
/// including the `&` and the `;`.
pub(crate) fn decode_entity(text: &str) -> Option<(String, usize)> {
    let rest = text.strip_prefix('&')?;
    if let Some(numeric) = rest.strip_prefix('#') {
        return decode_numeric(numeric).map(|(s, len)| (s, len + 2));
    }

    let bytes = rest.as_bytes();
    if !bytes.first()?.is_ascii_alphabetic() {
        return None;
    }
    let mut end = 1;
    while end < bytes.len() && bytes[end].is_ascii_alphanumeric() {
        end += 1;
    }
    if bytes.get(end) != Some(&b';') {
        return None;
    }
    let replacement = lookup_named_entity(&rest[..end])?;
    Some((replacement.to_string(), end + 2))
}

fn decode_numeric(text: &str) -> Option<(String, usize)> {
    let bytes = text.as_bytes();
    let hex = matches!(bytes.first(), Some(b'x' | b'X'));
    let digits_start = usize::from(hex);
    let mut end = digits_start;
    let (radix, max_digits) = if hex { (16, 6) } else { (10, 7) };
    while end < bytes.len() && (bytes[end] as char).is_digit(radix) {
        end += 1;
    }
    if end == digits_start || end - digits_start > max_digits {
        return None;
    }
    if bytes.get(end) != Some(&b';') {
        return None;
    }
    let value = u32::from_str_radix(&text[digits_start..end], radix).ok()?;
    // NUL and anything outside Unicode map to the replacement character.
    let c = match value {
        0 => '\u{FFFD}',
        v => char::from_u32(v).unwrap_or('\u{FFFD}'),
    };
    Some((c.to_string(), end + 1))
}
