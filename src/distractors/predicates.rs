//! Named predicates shared by the crypt and library distractor algorithms.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::catalog::names::{display_name, normalize, STOP_WORDS};

/// Names whose edit similarity reaches this ratio are too close to share a
/// multiple-choice grid.
pub const NAME_SIMILARITY_THRESHOLD: f64 = 0.75;

/// Words shorter than this never trigger the shared-word rule.
pub const SIGNIFICANT_WORD_LEN: usize = 3;

/// Bloodlines and successor clans folded onto the clan a player would confuse
/// them with. Imbued creeds form a single group.
static CLAN_AFFINITY: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("banu haqim", "assamite"),
        ("ministry", "followers of set"),
        ("hecata", "giovanni"),
        ("harbingers of skulls", "giovanni"),
        ("samedi", "giovanni"),
        ("nagaraja", "giovanni"),
        ("kiasyd", "lasombra"),
        ("gargoyle", "tremere"),
        ("daughter of cacophony", "toreador"),
        ("true brujah", "brujah"),
        ("ahrimane", "gangrel"),
        ("avenger", "imbued"),
        ("defender", "imbued"),
        ("innocent", "imbued"),
        ("judge", "imbued"),
        ("martyr", "imbued"),
        ("redeemer", "imbued"),
        ("visionary", "imbued"),
    ])
});

fn clan_group(clan: &str) -> String {
    let lowered = clan.trim().to_lowercase();
    let base = lowered.strip_suffix(" antitribu").unwrap_or(&lowered).trim();
    CLAN_AFFINITY
        .get(base)
        .map(|group| group.to_string())
        .unwrap_or_else(|| base.to_string())
}

/// Same clan, its antitribu, or a shared affinity group. Unknown clans are
/// never related.
pub fn are_clans_related(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) if !a.trim().is_empty() && !b.trim().is_empty() => {
            clan_group(a) == clan_group(b)
        }
        _ => false,
    }
}

pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// 1.0 for identical strings, 0.0 for nothing in common.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

fn significant_words(name: &str) -> Vec<&str> {
    name.split_whitespace()
        .filter(|w| w.len() >= SIGNIFICANT_WORD_LEN && !STOP_WORDS.contains(w))
        .collect()
}

/// Whether two card names would read as near-duplicates in one option grid.
///
/// Compares suffix-stripped, normalized names: equal, one containing the
/// other, a shared significant word (or one containing the other), or an edit
/// similarity at or above [`NAME_SIMILARITY_THRESHOLD`].
pub fn is_name_too_similar(a: &str, b: &str) -> bool {
    let a = normalize(&display_name(a));
    let b = normalize(&display_name(b));
    if a.is_empty() || b.is_empty() {
        return a == b;
    }
    if a == b || a.contains(&b) || b.contains(&a) {
        return true;
    }

    let words_b = significant_words(&b);
    let shares_word = significant_words(&a)
        .iter()
        .any(|wa| words_b.iter().any(|wb| wa.contains(wb) || wb.contains(wa)));
    if shares_word {
        return true;
    }

    name_similarity(&a, &b) >= NAME_SIMILARITY_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn antitribu_and_bloodlines_are_related() {
        assert!(are_clans_related(Some("Toreador"), Some("Toreador antitribu")));
        assert!(are_clans_related(Some("Giovanni"), Some("Harbingers of Skulls")));
        assert!(are_clans_related(Some("Avenger"), Some("Innocent")));
        assert!(!are_clans_related(Some("Ventrue"), Some("Tremere")));
        assert!(!are_clans_related(None, Some("Tremere")));
        assert!(!are_clans_related(Some(""), Some("")));
    }

    #[test]
    fn levenshtein_counts_edits() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("deflection", "deflection"), 0);
    }

    #[test]
    fn similar_names_are_flagged() {
        assert!(is_name_too_similar("Deflection", "Reflection"));
        assert!(is_name_too_similar("Blood Doll", "Blood Brother Ambush"));
        assert!(is_name_too_similar("Theo Bell", "Theo Bell (G2 ADV)"));
        assert!(is_name_too_similar("Govern", "Govern the Unaligned"));
    }

    #[test]
    fn unrelated_names_pass() {
        assert!(!is_name_too_similar("Deflection", "Telepathic Misdirection"));
        assert!(!is_name_too_similar("The Barrens", "The Rack"));
        assert!(!is_name_too_similar("Eagle's Sight", "Spirit's Touch"));
    }
}
