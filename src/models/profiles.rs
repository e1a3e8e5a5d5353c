use crate::utils::OcrError;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::Path;

// Character sets and engine parameters per document class live in a data
// table rather than in code.
const BUILTIN_PROFILES: &str = include_str!("../../config/profiles.json");

lazy_static! {
    static ref BUILTIN: CharacterProfiles = CharacterProfiles::from_json(BUILTIN_PROFILES)
        .expect("embedded profile table is valid");
}

/// Document classes, ordered from least to most Arabic content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentClass {
    Legal,
    Administrative,
    Bilingual,
    ArabicPrimary,
}

impl DocumentClass {
    pub const ALL: [DocumentClass; 4] = [
        DocumentClass::Legal,
        DocumentClass::Administrative,
        DocumentClass::Bilingual,
        DocumentClass::ArabicPrimary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentClass::Legal => "legal",
            DocumentClass::Administrative => "administrative",
            DocumentClass::Bilingual => "bilingual",
            DocumentClass::ArabicPrimary => "arabic_primary",
        }
    }
}

impl fmt::Display for DocumentClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// OCR configuration for one document class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentProfile {
    pub class: DocumentClass,
    pub description: String,
    pub character_sets: Vec<String>,
    pub whitelist: String,
    pub page_seg_mode: u32,
    pub engine_mode: u32,
    pub languages: String,
    pub preserve_interword_spaces: bool,
}

#[derive(Debug, Deserialize)]
struct ProfileTable {
    character_sets: BTreeMap<String, String>,
    profiles: Vec<ProfileEntry>,
}

#[derive(Debug, Deserialize)]
struct ProfileEntry {
    class: DocumentClass,
    description: String,
    character_sets: Vec<String>,
    page_seg_mode: u32,
    engine_mode: u32,
    languages: String,
    #[serde(default)]
    preserve_interword_spaces: bool,
}

/// The loaded profile table. Immutable once built.
#[derive(Debug, Clone)]
pub struct CharacterProfiles {
    profiles: HashMap<DocumentClass, DocumentProfile>,
}

impl CharacterProfiles {
    /// Profiles shipped with the crate.
    pub fn builtin() -> &'static CharacterProfiles {
        &BUILTIN
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, OcrError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| OcrError::IoError(format!("Failed to read profile table {:?}: {}", path, e)))?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, OcrError> {
        let table: ProfileTable = serde_json::from_str(json)
            .map_err(|e| OcrError::ConfigError(format!("Invalid profile table: {}", e)))?;

        let mut profiles = HashMap::new();
        for entry in table.profiles {
            let whitelist = build_whitelist(&table.character_sets, &entry.character_sets)?;
            let profile = DocumentProfile {
                class: entry.class,
                description: entry.description,
                character_sets: entry.character_sets,
                whitelist,
                page_seg_mode: entry.page_seg_mode,
                engine_mode: entry.engine_mode,
                languages: entry.languages,
                preserve_interword_spaces: entry.preserve_interword_spaces,
            };
            if profiles.insert(profile.class, profile).is_some() {
                return Err(OcrError::ConfigError(format!(
                    "Profile {} is defined twice",
                    entry.class
                )));
            }
        }

        for class in DocumentClass::ALL {
            if !profiles.contains_key(&class) {
                return Err(OcrError::ProfileNotFound(class.to_string()));
            }
        }

        Ok(CharacterProfiles { profiles })
    }

    pub fn get(&self, class: DocumentClass) -> Result<&DocumentProfile, OcrError> {
        self.profiles
            .get(&class)
            .ok_or_else(|| OcrError::ProfileNotFound(class.to_string()))
    }

    /// Profile for a detected script ratio.
    pub fn for_ratio(&self, ratio: f64) -> Result<&DocumentProfile, OcrError> {
        self.get(select_profile(ratio))
    }
}

/// Threshold ladder; each bound is exclusive.
pub fn select_profile(ratio: f64) -> DocumentClass {
    if ratio > 0.8 {
        DocumentClass::ArabicPrimary
    } else if ratio > 0.3 {
        DocumentClass::Bilingual
    } else if ratio > 0.1 {
        DocumentClass::Administrative
    } else {
        DocumentClass::Legal
    }
}

fn build_whitelist(sets: &BTreeMap<String, String>, names: &[String]) -> Result<String, OcrError> {
    let mut seen = HashSet::new();
    let mut whitelist = String::new();

    for name in names {
        let chars = sets
            .get(name)
            .ok_or_else(|| OcrError::ConfigError(format!("Unknown character set: {}", name)))?;
        for c in chars.chars() {
            if seen.insert(c) {
                whitelist.push(c);
            }
        }
    }

    Ok(whitelist)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_has_every_class() {
        let profiles = CharacterProfiles::builtin();
        for class in DocumentClass::ALL {
            let profile = profiles.get(class).unwrap();
            assert_eq!(profile.class, class);
            assert!(!profile.whitelist.is_empty());
        }
    }

    #[test]
    fn test_threshold_ladder() {
        assert_eq!(select_profile(0.95), DocumentClass::ArabicPrimary);
        assert_eq!(select_profile(0.8), DocumentClass::Bilingual);
        assert_eq!(select_profile(0.5), DocumentClass::Bilingual);
        assert_eq!(select_profile(0.3), DocumentClass::Administrative);
        assert_eq!(select_profile(0.2), DocumentClass::Administrative);
        assert_eq!(select_profile(0.1), DocumentClass::Legal);
        assert_eq!(select_profile(0.0), DocumentClass::Legal);
    }

    #[test]
    fn test_whitelist_is_deduplicated_union() {
        let profiles = CharacterProfiles::builtin();
        let arabic = profiles.get(DocumentClass::ArabicPrimary).unwrap();
        assert!(arabic.whitelist.contains('ب'));
        assert!(arabic.whitelist.contains('٣'));
        assert!(!arabic.whitelist.contains('Q'));

        let bilingual = profiles.get(DocumentClass::Bilingual).unwrap();
        assert!(bilingual.whitelist.contains('é'));
        let spaces = bilingual.whitelist.chars().filter(|c| *c == ' ').count();
        assert_eq!(spaces, 1);
    }

    #[test]
    fn test_missing_class_is_rejected() {
        let json = r#"{
            "character_sets": {"digits": "0123456789"},
            "profiles": [
                {"class": "legal", "description": "", "character_sets": ["digits"],
                 "page_seg_mode": 6, "engine_mode": 1, "languages": "fra"}
            ]
        }"#;
        match CharacterProfiles::from_json(json) {
            Err(OcrError::ProfileNotFound(name)) => assert_eq!(name, "administrative"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_character_set_is_rejected() {
        let json = r#"{
            "character_sets": {},
            "profiles": [
                {"class": "legal", "description": "", "character_sets": ["nope"],
                 "page_seg_mode": 6, "engine_mode": 1, "languages": "fra"}
            ]
        }"#;
        assert!(matches!(
            CharacterProfiles::from_json(json),
            Err(OcrError::ConfigError(_))
        ));
    }

    #[test]
    fn test_for_ratio_selects_profile() {
        let profiles = CharacterProfiles::builtin();
        assert_eq!(profiles.for_ratio(0.9).unwrap().languages, "ara");
        assert_eq!(profiles.for_ratio(0.0).unwrap().class, DocumentClass::Legal);
    }
}
