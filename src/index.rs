//! # Command index
//!
//! The compact `name → platform → languages` lookup table used by the
//! resolver, built from the upstream command manifest (`index.json` of the
//! tldr pages project) and persisted under the cache root.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::Result;

/// Language whose pages live under the unsuffixed `pages` tree.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Platform shared by all operating systems.
pub const COMMON_PLATFORM: &str = "common";

/// The `(name, platform, language)` triple chosen for a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub platform: String,
    pub language: String,
}

/// Supported platforms and languages per command.
///
/// Ordered collections keep lookups and the serialized form deterministic.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Index {
    commands: BTreeMap<String, BTreeMap<String, BTreeSet<String>>>,
}

#[derive(Deserialize)]
struct Manifest {
    commands: Vec<ManifestCommand>,
}

#[derive(Deserialize)]
struct ManifestCommand {
    name: String,
    #[serde(default)]
    platform: Vec<String>,
    #[serde(default)]
    language: Vec<String>,
    #[serde(default)]
    targets: Vec<ManifestTarget>,
}

#[derive(Deserialize)]
struct ManifestTarget {
    os: String,
    language: String,
}

impl Index {
    /// Build an index from the upstream manifest JSON.
    ///
    /// Exact `targets` pairs are used when a record has them, otherwise every
    /// listed platform is assumed to carry every listed language.
    ///
    /// # Errors
    /// Returns an error if the manifest is not valid JSON of the expected shape.
    pub fn from_manifest(data: &[u8]) -> Result<Self> {
        let manifest: Manifest = serde_json::from_slice(data)?;
        let mut index = Index::default();

        for command in manifest.commands {
            if command.targets.is_empty() {
                for platform in &command.platform {
                    for language in &command.language {
                        index.insert(&command.name, platform, language);
                    }
                }
            } else {
                for target in &command.targets {
                    index.insert(&command.name, &target.os, &target.language);
                }
            }
        }

        Ok(index)
    }

    /// Parse a previously stored index.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Serialize for storage.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Record that `name` has a page for `platform` in `language`.
    pub fn insert(&mut self, name: &str, platform: &str, language: &str) {
        self.commands
            .entry(name.to_string())
            .or_default()
            .entry(platform.to_string())
            .or_default()
            .insert(language.to_string());
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Pick the best available platform and language for `name`.
    ///
    /// The requested platform wins if supported, then `common`, then the
    /// lexicographically first supported platform. The language is the first
    /// entry of `languages` that the chosen platform carries. Returns `None`
    /// when the command is unknown or no preferred language is available.
    pub fn search(&self, name: &str, platform: &str, languages: &[String]) -> Option<Target> {
        let platforms = self.commands.get(name)?;

        let (platform, supported) = platforms
            .get_key_value(platform)
            .or_else(|| platforms.get_key_value(COMMON_PLATFORM))
            .or_else(|| platforms.iter().next())?;

        let language = languages.iter().find(|lang| supported.contains(lang.as_str()))?;

        Some(Target {
            name: name.to_string(),
            platform: platform.clone(),
            language: language.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn langs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn single_platform_index() -> Index {
        Index::from_json(br#"{"tldr": {"linux": ["en"]}}"#).unwrap()
    }

    #[test]
    fn falls_back_to_only_platform() {
        let target = single_platform_index()
            .search("tldr", "osx", &langs(&["en"]))
            .unwrap();

        assert_eq!(target.name, "tldr");
        assert_eq!(target.platform, "linux");
        assert_eq!(target.language, "en");
    }

    #[test]
    fn unsupported_language_is_no_match() {
        let index = single_platform_index();
        assert_eq!(index.search("tldr", "linux", &langs(&["zh"])), None);
    }

    #[test]
    fn unknown_command_is_no_match() {
        let index = single_platform_index();
        assert_eq!(index.search("nope", "linux", &langs(&["en"])), None);
    }

    #[test]
    fn requested_platform_then_common() {
        let mut index = Index::default();
        index.insert("tar", "common", "en");
        index.insert("tar", "osx", "en");
        index.insert("tar", "windows", "en");

        let osx = index.search("tar", "osx", &langs(&["en"])).unwrap();
        assert_eq!(osx.platform, "osx");

        let linux = index.search("tar", "linux", &langs(&["en"])).unwrap();
        assert_eq!(linux.platform, "common");
    }

    #[test]
    fn fallback_platform_is_lexicographic() {
        let mut index = Index::default();
        index.insert("dir", "windows", "en");
        index.insert("dir", "android", "en");
        index.insert("dir", "sunos", "en");

        let target = index.search("dir", "linux", &langs(&["en"])).unwrap();
        assert_eq!(target.platform, "android");
    }

    #[test]
    fn first_preferred_language_wins() {
        let mut index = Index::default();
        index.insert("ls", "common", "en");
        index.insert("ls", "common", "de");
        index.insert("ls", "common", "it");

        let target = index.search("ls", "common", &langs(&["fr", "it", "de", "en"])).unwrap();
        assert_eq!(target.language, "it");
    }

    #[test]
    fn language_is_checked_against_chosen_platform() {
        let mut index = Index::default();
        index.insert("top", "linux", "en");
        index.insert("top", "osx", "zh");

        assert_eq!(index.search("top", "linux", &langs(&["zh"])), None);
        let target = index.search("top", "osx", &langs(&["zh"])).unwrap();
        assert_eq!(target.language, "zh");
    }

    #[test]
    fn manifest_targets_are_exact() {
        let manifest = br#"{
            "commands": [
                {
                    "name": "git-log",
                    "platform": ["common", "linux"],
                    "language": ["en", "zh"],
                    "targets": [
                        {"os": "common", "language": "en"},
                        {"os": "common", "language": "zh"},
                        {"os": "linux", "language": "en"}
                    ]
                }
            ]
        }"#;

        let index = Index::from_manifest(manifest).unwrap();
        let expected = Index::from_json(
            br#"{"git-log": {"common": ["en", "zh"], "linux": ["en"]}}"#,
        )
        .unwrap();

        assert_eq!(index, expected);
    }

    #[test]
    fn manifest_without_targets_uses_cross_product() {
        let manifest = br#"{
            "commands": [
                {"name": "7z", "platform": ["common", "osx"], "language": ["en", "es"]}
            ]
        }"#;

        let index = Index::from_manifest(manifest).unwrap();

        assert_eq!(index.len(), 1);
        let target = index.search("7z", "osx", &langs(&["es"])).unwrap();
        assert_eq!(target.platform, "osx");
        assert_eq!(target.language, "es");
    }

    #[test]
    fn invalid_manifest_is_an_error() {
        assert!(Index::from_manifest(b"<html>").is_err());
        assert!(Index::from_manifest(br#"{"pages": []}"#).is_err());
    }

    #[test]
    fn stored_form_round_trips() {
        let mut index = Index::default();
        index.insert("tar", "common", "en");
        index.insert("tar", "common", "pt_BR");

        let stored = index.to_json().unwrap();
        assert_eq!(Index::from_json(&stored).unwrap(), index);
    }
}
