//! Company-name canonicalization and seniority classification.

use skillboard_core::Level;

pub const UNKNOWN_COMPANY: &str = "Unknown";

/// Legal-entity patterns, stripped in this order.
///
/// A pattern is only removed when it ends a token (followed by end of text,
/// whitespace or a comma). Without that rule `" inc"` would be cut out of
/// `" inc."` before the `" inc."` pattern is reached, leaving a stray dot,
/// and out of words such as `" incorporated"`.
const COMPANY_SUFFIXES: &[&str] = &[", inc.", " inc", " ltd", " llc", ".com", " inc."];

/// Ordered keyword rules; the first set with a hit decides the level.
const LEVEL_RULES: &[(&[&str], Level)] = &[
    (&["intern", "junior", "entry level", "graduate"], Level::Entry),
    (&["senior", "lead", "principal", "staff"], Level::Senior),
    (&["mid-level", "mid level", "midlevel", "associate"], Level::Mid),
];

const DEFAULT_LEVEL: Level = Level::Mid;

/// Canonicalize a company display name.
///
/// Lower-cases, strips legal-entity suffixes until none remain, collapses
/// whitespace and title-cases the result. Blank input yields
/// [`UNKNOWN_COMPANY`]. Applying it to its own output is a no-op.
pub fn normalize_company(name: &str) -> String {
    let key = company_key(name);
    if key.is_empty() {
        return UNKNOWN_COMPANY.to_string();
    }
    let titled = title_case(&key);
    // Case folding is context-sensitive for a few scripts (final sigma);
    // keep the lower-case key whenever title-casing would change it.
    if company_key(&titled) == key {
        titled
    } else {
        key
    }
}

/// Lower-cased name with suffixes stripped and whitespace collapsed,
/// repeated to a fixed point.
fn company_key(name: &str) -> String {
    let mut text = collapse_whitespace(&name.to_lowercase());
    loop {
        let stripped = COMPANY_SUFFIXES
            .iter()
            .fold(text.clone(), |acc, pattern| strip_token(&acc, pattern));
        let stripped = collapse_whitespace(&stripped);
        if stripped == text {
            return text;
        }
        text = stripped;
    }
}

/// Seniority from the posting's title and description.
pub fn classify_level(title: &str, description: &str) -> Level {
    let text = format!("{title} {description}").to_lowercase();
    LEVEL_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| text.contains(k)))
        .map(|(_, level)| *level)
        .unwrap_or(DEFAULT_LEVEL)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn ends_token(rest: &str) -> bool {
    rest.chars().next().map_or(true, |c| c.is_whitespace() || c == ',')
}

/// Remove every occurrence of `pattern` that ends a token.
fn strip_token(text: &str, pattern: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(pattern) {
        let after = &rest[pos + pattern.len()..];
        if ends_token(after) {
            out.push_str(&rest[..pos]);
            rest = after;
        } else {
            // Step one char past the match start so overlapping hits are still seen.
            let step = rest[pos..].chars().next().map_or(1, char::len_utf8);
            out.push_str(&rest[..pos + step]);
            rest = &rest[pos + step..];
        }
    }
    out.push_str(rest);
    out
}

/// Upper-case the first letter of every alphabetic run.
///
/// Input is already lower-case. A letter whose upper case does not fold
/// back to it (`ı`, `ς`, `ß`) is left as is.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() && !prev_alpha {
            out.push(upper_if_reversible(c));
        } else {
            out.push(c);
        }
        prev_alpha = c.is_alphabetic();
    }
    out
}

fn upper_if_reversible(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) if u.to_lowercase().eq(std::iter::once(c)) => u,
        _ => c,
    }
}
