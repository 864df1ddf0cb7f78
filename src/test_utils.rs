//! Shared fixtures for unit tests.

/// Helpers shared across test modules.
pub mod serde {
    use std::fmt::Debug;

    /// Assert that a value survives a serde_json round-trip using structural equality.
    pub fn assert_round_trip_eq<T>(value: &T)
    where
        T: ::serde::Serialize + ::serde::de::DeserializeOwned + PartialEq + Debug,
    {
        let json = serde_json::to_string(value)
            .expect("serialization should succeed during round-trip testing");
        let restored: T = serde_json::from_str(&json)
            .expect("deserialization should succeed during round-trip testing");
        assert_eq!(restored, *value, "serde_json round-trip altered the value");
    }
}

pub mod fixtures {
    use std::sync::Arc;

    use crate::catalog::{Card, CardCatalog, CardDataset, CardId, CardKind, DifficultyTier};
    use crate::distractors::PremiumDistractorTable;

    fn tier(value: u8) -> DifficultyTier {
        DifficultyTier::new(value).expect("fixture tier in range")
    }

    pub fn library_card(id: u32, name: &str, difficulty: u8, types: &[&str], disciplines: &[&str]) -> Card {
        Card {
            id: CardId(id),
            name: name.to_string(),
            slug: crate::catalog::names::normalize(name).replace(' ', ""),
            types: types.iter().map(|t| t.to_string()).collect(),
            disciplines: disciplines.iter().map(|d| d.to_string()).collect(),
            clan: None,
            capacity: None,
            group: None,
            gender: None,
            count: 100 / difficulty as u32,
            difficulty: tier(difficulty),
            pool_cost: None,
            blood_cost: None,
            conviction_cost: None,
            kind: CardKind::Library,
        }
    }

    pub fn crypt_card(id: u32, name: &str, difficulty: u8, clan: &str, capacity: u8) -> Card {
        Card {
            id: CardId(id),
            name: name.to_string(),
            slug: crate::catalog::names::normalize(name).replace(' ', ""),
            types: vec!["Vampire".to_string()],
            disciplines: Vec::new(),
            clan: Some(clan.to_string()),
            capacity: Some(capacity),
            group: Some("4".to_string()),
            gender: None,
            count: 100 / difficulty as u32,
            difficulty: tier(difficulty),
            pool_cost: None,
            blood_cost: None,
            conviction_cost: None,
            kind: CardKind::Crypt,
        }
    }

    pub fn imbued_card(id: u32, name: &str, difficulty: u8, creed: &str, capacity: u8) -> Card {
        Card {
            types: vec!["Imbued".to_string()],
            ..crypt_card(id, name, difficulty, creed, capacity)
        }
    }

    pub fn sample_library() -> Vec<Card> {
        vec![
            library_card(100, "Deflection", 1, &["Reaction"], &["aus"]),
            library_card(101, "Telepathic Misdirection", 1, &["Reaction"], &["aus"]),
            library_card(102, "Eagle's Sight", 1, &["Reaction"], &["aus"]),
            library_card(103, "Spirit's Touch", 1, &["Reaction"], &["aus"]),
            library_card(104, "Forced Awakening", 1, &["Reaction"], &["aus"]),
            library_card(105, "Reflection", 1, &["Reaction"], &["aus"]),
            library_card(106, "Blood Doll", 1, &["Master"], &[]),
            library_card(107, "Govern the Unaligned", 1, &["Action"], &["dom"]),
            library_card(108, "Conditioning", 1, &["Action"], &["dom"]),
            library_card(109, "Immortal Grapple", 1, &["Combat"], &["pot"]),
            library_card(110, "On the Qui Vive", 1, &["Reaction"], &[]),
            library_card(111, "Wake with Evening's Freshness", 1, &["Reaction"], &[]),
            library_card(120, "Pentex Subversion", 2, &["Master"], &[]),
            library_card(121, "Dreams of the Sphinx", 2, &["Master"], &[]),
            library_card(122, "Zillah's Valley", 2, &["Master"], &[]),
            library_card(123, "Freak Drive", 2, &["Action Modifier"], &[]),
            library_card(124, "Cloak the Gathering", 2, &["Action Modifier"], &["obf"]),
            library_card(125, "Lost in Crowds", 2, &["Action Modifier"], &["obf"]),
            library_card(130, "Hide the Heart", 3, &["Reaction"], &["aus"]),
            library_card(131, "Sense the Savage Way", 3, &["Reaction"], &["aus"]),
            library_card(132, "Archon Investigation", 3, &["Reaction"], &[]),
            library_card(133, "The Barrens", 3, &["Master"], &[]),
            library_card(140, "Kiss of Ra", 4, &["Combat"], &[]),
            library_card(141, "Hunger Moon", 4, &["Master"], &[]),
            library_card(142, "Ashur Tablets", 4, &["Master"], &[]),
            library_card(150, "Cryptic Mission", 5, &["Action"], &[]),
            library_card(151, "Scouting Mission", 5, &["Action"], &[]),
            library_card(152, "Angel of Berlin", 5, &["Ally"], &[]),
            Card {
                conviction_cost: Some("1".to_string()),
                ..library_card(153, "Determine", 5, &["Power"], &[])
            },
        ]
    }

    pub fn sample_crypt() -> Vec<Card> {
        vec![
            crypt_card(200, "Anson", 1, "Ventrue", 8),
            crypt_card(201, "Queen Anne", 1, "Ventrue", 10),
            crypt_card(202, "Theo Bell", 1, "Brujah", 7),
            crypt_card(203, "Theo Bell (G2 ADV)", 1, "Brujah", 8),
            crypt_card(210, "Arika", 2, "Ventrue", 11),
            crypt_card(211, "Gwendolyn", 2, "Toreador antitribu", 5),
            crypt_card(220, "Anneke", 3, "Toreador", 8),
            crypt_card(221, "Arikel", 3, "Toreador", 11),
            crypt_card(230, "Pieterzoon", 4, "Tremere", 8),
            crypt_card(231, "Etrius", 4, "Tremere", 11),
            crypt_card(232, "Goratrix", 4, "Tremere antitribu", 10),
            imbued_card(240, "Sister Christine", 5, "Innocent", 3),
            imbued_card(241, "Cassidy", 5, "Avenger", 5),
        ]
    }

    pub fn sample_dataset() -> CardDataset {
        CardDataset {
            metadata: Default::default(),
            crypt: sample_crypt(),
            library: sample_library(),
        }
    }

    pub fn sample_catalog() -> Arc<CardCatalog> {
        Arc::new(CardCatalog::from_dataset(sample_dataset()).expect("fixture dataset is valid"))
    }

    pub fn sample_premium() -> Arc<PremiumDistractorTable> {
        let mut table = PremiumDistractorTable::default();
        table.insert(
            "Govern the Unaligned",
            ["Conditioning", "Unknown Card", "Blood Doll", "Immortal Grapple", "Freak Drive"],
        );
        Arc::new(table)
    }
}
