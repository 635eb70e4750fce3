//! The voice-line catalog.
//!
//! Lines are organised in named groups so that a whole batch (all insults,
//! say) can be switched off without touching the others. The catalog is
//! plain JSON:
//!
//! ```json
//! {
//!   "groups": [
//!     {
//!       "name": "startup",
//!       "enabled": true,
//!       "lines": [
//!         { "text": "Collect keys from each level.", "output_path": "./AI_GEN/start_up.wav" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! `enabled` defaults to `true` on both groups and lines.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{RenderError, Result};

const BUILTIN_CATALOG: &str = include_str!("../voice_lines.json");

fn enabled_by_default() -> bool {
    true
}

/// One text to render and where to put it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VoiceLine {
    pub text: String,
    pub output_path: PathBuf,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

impl VoiceLine {
    pub fn new(text: impl Into<String>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            text: text.into(),
            output_path: output_path.into(),
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// A named batch of lines sharing one on/off switch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VoiceGroup {
    pub name: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub lines: Vec<VoiceLine>,
}

/// An entry as seen by the batch driver: the line plus its effective state.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry<'a> {
    pub group: &'a str,
    pub line: &'a VoiceLine,
    /// True only when both the group and the line are enabled.
    pub enabled: bool,
}

/// Ordered collection of voice-line groups.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub groups: Vec<VoiceGroup>,
}

impl Catalog {
    /// Build a catalog holding a single enabled group.
    pub fn from_lines(name: impl Into<String>, lines: Vec<VoiceLine>) -> Self {
        Self {
            groups: vec![VoiceGroup {
                name: name.into(),
                enabled: true,
                lines,
            }],
        }
    }

    /// The catalog shipped with the crate (`voice_lines.json`).
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Self =
            serde_json::from_str(json).map_err(|e| RenderError::Catalog(e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RenderError::Catalog(format!("{}: {e}", path.display())))?;
        log::info!("Loading voice-line catalog from {}", path.display());
        Self::from_json(&content)
    }

    /// All entries in catalog order, enabled or not.
    pub fn entries(&self) -> impl Iterator<Item = CatalogEntry<'_>> {
        self.groups.iter().flat_map(|group| {
            group.lines.iter().map(move |line| CatalogEntry {
                group: &group.name,
                line,
                enabled: group.enabled && line.enabled,
            })
        })
    }

    /// Number of lines that a run would render.
    pub fn enabled_count(&self) -> usize {
        self.entries().filter(|e| e.enabled).count()
    }

    fn validate(&self) -> Result<()> {
        for entry in self.entries() {
            if entry.line.output_path.as_os_str().is_empty() {
                return Err(RenderError::Catalog(format!(
                    "line {:?} in group '{}' has an empty output_path",
                    entry.line.text, entry.group
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_and_line_flags_combine() {
        let catalog = Catalog::from_json(
            r#"{
                "groups": [
                    { "name": "a", "lines": [
                        { "text": "one", "output_path": "out/1.wav" },
                        { "text": "two", "output_path": "out/2.wav", "enabled": false }
                    ] },
                    { "name": "b", "enabled": false, "lines": [
                        { "text": "three", "output_path": "out/3.wav" }
                    ] }
                ]
            }"#,
        )
        .unwrap();

        let states: Vec<(&str, bool)> = catalog
            .entries()
            .map(|e| (e.line.text.as_str(), e.enabled))
            .collect();
        assert_eq!(states, vec![("one", true), ("two", false), ("three", false)]);
        assert_eq!(catalog.enabled_count(), 1);
    }

    #[test]
    fn rejects_malformed_json() {
        let err = Catalog::from_json(r#"{ "groups": [ { "lines": [] } ] }"#).unwrap_err();
        assert!(matches!(err, RenderError::Catalog(_)));
    }

    #[test]
    fn unreadable_catalog_names_the_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("voice_lines.json");
        match Catalog::from_path(&path) {
            Err(RenderError::Catalog(msg)) => assert!(msg.contains("voice_lines.json"), "{msg}"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn loads_catalog_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("voice_lines.json");
        std::fs::write(
            &path,
            r#"{ "groups": [ { "name": "a", "lines": [ { "text": "x", "output_path": "x.wav" } ] } ] }"#,
        )
        .unwrap();
        let catalog = Catalog::from_path(&path).unwrap();
        assert_eq!(catalog.enabled_count(), 1);
    }

    #[test]
    fn rejects_empty_output_path() {
        let err = Catalog::from_json(
            r#"{ "groups": [ { "name": "a", "lines": [ { "text": "x", "output_path": "" } ] } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::Catalog(_)));
    }

    #[test]
    fn builtin_catalog_renders_only_the_startup_message() {
        let catalog = Catalog::builtin().unwrap();
        let enabled: Vec<_> = catalog.entries().filter(|e| e.enabled).collect();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].group, "startup");
        assert_eq!(
            enabled[0].line.output_path,
            PathBuf::from("./AI_GEN/start_up.wav")
        );
    }

    #[test]
    fn builtin_insults_are_numbered_in_order() {
        let catalog = Catalog::builtin().unwrap();
        let insults = catalog.groups.iter().find(|g| g.name == "insults").unwrap();
        assert!(!insults.enabled);
        assert_eq!(insults.lines.len(), 46);
        for (i, line) in insults.lines.iter().enumerate() {
            assert_eq!(
                line.output_path,
                PathBuf::from(format!("./AI_GEN/insult/{}.wav", i + 1))
            );
        }
    }
}
