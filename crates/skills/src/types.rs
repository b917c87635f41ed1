use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Version assigned to a plugin that has never been published.
pub const DEFAULT_PLUGIN_VERSION: &str = "1.0.0";

/// Persisted descriptions are clamped to this many characters.
pub const DESCRIPTION_LIMIT: usize = 200;

/// Top-level authoring directories that are never skill sources.
pub const EXCLUDED_SOURCE_DIRS: &[&str] = &[".git", ".cursor", "my-marketplace"];

/// Basenames excluded from mirrored trees and fingerprinting at any depth.
pub const EXCLUDED_TREE_NAMES: &[&str] = &["__pycache__", ".DS_Store"];

// ── Skill metadata ───────────────────────────────────────────────────────────

/// Metadata for one discovered skill, parsed from SKILL.md frontmatter.
///
/// Constructed during discovery and read-only afterward; only artifacts
/// derived from it are persisted.
#[derive(Debug, Clone)]
pub struct SkillMeta {
    /// Authoring directory name (may differ from the logical name).
    pub dir_name: String,
    /// Logical identifier; the unique key across registry and target paths.
    pub name: String,
    /// Free-text description; possibly empty.
    pub description: String,
    /// Path to the authoring directory.
    pub source_dir: PathBuf,
}

impl SkillMeta {
    /// Description as persisted: clamped, with a synthesized fallback when
    /// the frontmatter description is empty.
    #[must_use]
    pub fn persisted_description(&self) -> String {
        let text = if self.description.is_empty() {
            format!("{} skill", self.name)
        } else {
            self.description.clone()
        };
        text.chars().take(DESCRIPTION_LIMIT).collect()
    }
}

// ── Marketplace layout ───────────────────────────────────────────────────────

/// Marketplace identity and on-disk layout.
///
/// All generated paths derive from `root`, so tests can point a marketplace
/// at a temporary directory. The identity fields seed freshly created
/// registry documents and plugin descriptors.
#[derive(Debug, Clone)]
pub struct Marketplace {
    pub root: PathBuf,
    pub name: String,
    pub owner: String,
    pub description: String,
}

impl Marketplace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            name: "hideki-plugins".into(),
            owner: "Hideki".into(),
            description: "Custom Claude Code plugins by Hideki".into(),
        }
    }

    /// Central registry document: `<root>/.claude-plugin/marketplace.json`.
    #[must_use]
    pub fn registry_path(&self) -> PathBuf {
        self.root.join(".claude-plugin").join("marketplace.json")
    }

    #[must_use]
    pub fn plugins_dir(&self) -> PathBuf {
        self.root.join("plugins")
    }

    /// Root of one plugin: `plugins/<name>/`.
    #[must_use]
    pub fn plugin_dir(&self, name: &str) -> PathBuf {
        self.plugins_dir().join(name)
    }

    /// Mirrored skill tree inside one plugin: `plugins/<name>/skills/<name>/`.
    #[must_use]
    pub fn plugin_skill_dir(&self, name: &str) -> PathBuf {
        self.plugin_dir(name).join("skills").join(name)
    }

    /// Registry document skeleton used when none exists on disk yet.
    #[must_use]
    pub fn empty_registry(&self) -> RegistryDoc {
        RegistryDoc {
            name: self.name.clone(),
            owner: OwnerRef {
                name: self.owner.clone(),
            },
            metadata: None,
            plugins: Vec::new(),
        }
    }
}

// ── Persisted documents ──────────────────────────────────────────────────────

/// `{ "name": ... }` object used for both `author` and `owner` fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerRef {
    pub name: String,
}

/// `plugin.json` descriptor written under a plugin's `.claude-plugin/`.
///
/// Everything here is recomputed from current frontmatter on each sync
/// except `version`, which survives from the previous descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginDescriptor {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: OwnerRef,
    pub keywords: Vec<String>,
    pub license: String,
    pub skills: String,
}

/// Single-plugin `marketplace.json` fragment written beside `plugin.json`,
/// consumed as an isolated marketplace by the plugin tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketplaceFragment {
    pub name: String,
    pub owner: OwnerRef,
    pub metadata: FragmentMetadata,
    pub plugins: Vec<FragmentEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FragmentMetadata {
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FragmentEntry {
    pub name: String,
    pub source: LocalSource,
    pub description: String,
    pub version: String,
}

/// `{ "type": "local", "path": "." }` source pointer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalSource {
    #[serde(rename = "type")]
    pub kind: String,
    pub path: String,
}

impl Default for LocalSource {
    fn default() -> Self {
        Self {
            kind: "local".into(),
            path: ".".into(),
        }
    }
}

/// Central marketplace registry document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryDoc {
    pub name: String,
    pub owner: OwnerRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<FragmentMetadata>,
    #[serde(default)]
    pub plugins: Vec<RegistryEntry>,
}

/// One plugin entry in the central registry, keyed by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub name: String,
    pub source: String,
    pub description: String,
}
