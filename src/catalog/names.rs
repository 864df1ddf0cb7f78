//! Card-name normalization and guess matching.
//!
//! Two names are compared after folding away everything a player cannot be
//! expected to type: diacritics, case, punctuation. The aggressive form also
//! drops short English stop words and all whitespace, so "Wake with Evening's
//! Freshness" matches "wake evenings freshness".

use unicode_normalization::UnicodeNormalization;

pub const STOP_WORDS: [&str; 12] = [
    "the", "and", "of", "a", "an", "in", "on", "at", "by", "for", "with", "to",
];

/// Lowercase ASCII-alphanumeric form with single spaces between words.
pub fn normalize(name: &str) -> String {
    let folded = name
        .nfd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();

    folded
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn normalize_aggressive(name: &str) -> String {
    normalize(name)
        .split_whitespace()
        .filter(|word| !STOP_WORDS.contains(word))
        .collect::<String>()
}

/// Strips trailing group (`(G4)`) and advanced (`(ADV)`, `(G2 ADV)`) markers.
pub fn display_name(name: &str) -> String {
    let mut current = name.trim_end();
    while let Some(stripped) = strip_marker(current) {
        current = stripped;
    }
    current.to_string()
}

fn strip_marker(name: &str) -> Option<&str> {
    let body = name.strip_suffix(')')?;
    let open = body.rfind('(')?;
    let inner = &body[open + 1..];
    let is_group = match inner.strip_prefix(['G', 'g']) {
        Some(digits) => !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()),
        None => false,
    };
    let is_advanced = inner.to_ascii_lowercase().contains("adv");
    if is_group || is_advanced {
        Some(body[..open].trim_end())
    } else {
        None
    }
}

/// Free-text guess check. A guess never matches when it normalizes to nothing.
pub fn is_correct_guess(guess: &str, card_name: &str) -> bool {
    let guess_plain = normalize(guess);
    if guess_plain.is_empty() {
        return false;
    }
    let guess_aggressive = normalize_aggressive(guess);
    let base = display_name(card_name);

    [card_name, base.as_str()].iter().any(|candidate| {
        let plain = normalize(candidate);
        if plain == guess_plain {
            return true;
        }
        let aggressive = normalize_aggressive(candidate);
        !aggressive.is_empty() && aggressive == guess_aggressive
    })
}

/// "Blood Doll" -> "B.... D...". Stop words are fully masked.
pub fn initials_hint(name: &str) -> String {
    display_name(name)
        .split_whitespace()
        .map(|word| {
            let len = word.chars().count();
            let lowered = normalize(word);
            if STOP_WORDS.contains(&lowered.as_str()) {
                return ".".repeat(len);
            }
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    let mut masked = String::with_capacity(len);
                    masked.push(first);
                    masked.push_str(&".".repeat(len - 1));
                    masked
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
