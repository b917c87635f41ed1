use std::path::Path;

use {anyhow::Context, serde::Serialize, tracing::debug};

use crate::types::{
    DEFAULT_PLUGIN_VERSION, FragmentEntry, FragmentMetadata, LocalSource, Marketplace,
    MarketplaceFragment, OwnerRef, PluginDescriptor, SkillMeta,
};

/// Metadata directory inside a plugin root.
const PLUGIN_META_DIR: &str = ".claude-plugin";

/// Write `data` as pretty-printed JSON with a trailing newline, creating
/// parent directories as needed.
pub(crate) fn write_json<T: Serialize>(path: &Path, data: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    let mut text = serde_json::to_string_pretty(data)?;
    text.push('\n');
    std::fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Carry forward the version of a previously published descriptor.
///
/// A missing or unparseable plugin.json is not an error: the plugin simply
/// starts over at the default version.
fn prior_version(plugin_json: &Path) -> String {
    let Ok(text) = std::fs::read_to_string(plugin_json) else {
        return DEFAULT_PLUGIN_VERSION.to_string();
    };
    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(value) => value
            .get("version")
            .and_then(serde_json::Value::as_str)
            .unwrap_or(DEFAULT_PLUGIN_VERSION)
            .to_string(),
        Err(e) => {
            debug!(path = %plugin_json.display(), %e, "unparseable plugin.json, using default version");
            DEFAULT_PLUGIN_VERSION.to_string()
        },
    }
}

/// Write `plugin.json` and the single-plugin `marketplace.json` fragment
/// for one synced skill. Both files are rewritten from current frontmatter;
/// only the version string survives from a previous run.
pub fn write_plugin_metadata(marketplace: &Marketplace, meta: &SkillMeta) -> anyhow::Result<()> {
    let meta_dir = marketplace.plugin_dir(&meta.name).join(PLUGIN_META_DIR);
    let plugin_json_path = meta_dir.join("plugin.json");

    let version = prior_version(&plugin_json_path);
    let description = meta.persisted_description();

    let descriptor = PluginDescriptor {
        name: meta.name.clone(),
        version: version.clone(),
        description: description.clone(),
        author: OwnerRef {
            name: marketplace.owner.clone(),
        },
        keywords: vec![meta.name.clone()],
        license: "MIT".to_string(),
        skills: "./skills".to_string(),
    };
    write_json(&plugin_json_path, &descriptor)?;

    let fragment = MarketplaceFragment {
        name: marketplace.name.clone(),
        owner: OwnerRef {
            name: marketplace.owner.clone(),
        },
        metadata: FragmentMetadata {
            description: marketplace.description.clone(),
        },
        plugins: vec![FragmentEntry {
            name: meta.name.clone(),
            source: LocalSource::default(),
            description,
            version,
        }],
    };
    write_json(&meta_dir.join("marketplace.json"), &fragment)
}
