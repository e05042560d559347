use crate::extract::patterns::{KNOWN_MAKES, PRICE_RE, YEAR_RE};

/// Separator the site uses between inline detail chips ("Automatic · 2018 · On Island").
const CHIP_SEPARATOR: char = '·';
const PRICE_LINE_MAX_CHARS: usize = 20;
const FALLBACK_TITLE_CHARS: usize = 60;

/// First line that is neither a bare price nor a row of detail chips,
/// else the first 60 characters of the whitespace-collapsed text.
pub fn extract_title(text: &str) -> String {
    let text = text.replace('\t', " ");
    let candidate = text.lines().map(str::trim).find(|line| {
        !line.is_empty()
            && !(PRICE_RE.is_match(line) && line.chars().count() < PRICE_LINE_MAX_CHARS)
            && !line.contains(CHIP_SEPARATOR)
    });
    if let Some(line) = candidate {
        return line.to_string();
    }

    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(FALLBACK_TITLE_CHARS)
        .collect()
}

/// Split a title into `(make, model)`.
///
/// Year tokens are removed first. A known make that prefixes the rest
/// (case-insensitive, no word-boundary check) wins; otherwise the first word
/// is the make. An empty remainder yields an empty make and the original
/// title as model.
pub fn split_make_model(title: &str) -> (String, String) {
    let stripped = YEAR_RE.replace_all(title, "");
    let stripped = stripped.trim();

    for make in KNOWN_MAKES {
        if let Some(rest) = strip_prefix_ignore_case(stripped, make) {
            return ((*make).to_string(), rest.trim().to_string());
        }
    }

    let mut words = stripped.split_whitespace();
    match words.next() {
        None => (String::new(), title.to_string()),
        Some(first) => (first.to_string(), words.collect::<Vec<_>>().join(" ")),
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let mut text_chars = text.char_indices();
    for expected in prefix.chars() {
        let (_, actual) = text_chars.next()?;
        if !actual.to_uppercase().eq(expected.to_uppercase()) {
            return None;
        }
    }
    let offset = text_chars.next().map_or(text.len(), |(idx, _)| idx);
    Some(&text[offset..])
}
