use std::{collections::BTreeMap, path::Path};

use {anyhow::Context, tracing::debug};

use crate::types::{Marketplace, RegistryDoc, RegistryEntry, SkillMeta};

/// Merge a batch of freshly synced skills into the central registry.
///
/// Entries for plugins outside the batch are preserved as-is; stale entries
/// are never pruned. The document is rewritten whole, sorted by name, via a
/// temp file + rename so readers never observe a torn write. There is no
/// protection against concurrent writers — single-writer is a precondition.
pub fn reconcile_registry(marketplace: &Marketplace, synced: &[SkillMeta]) -> anyhow::Result<()> {
    let path = marketplace.registry_path();

    let mut registry = if path.exists() {
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("read {}", path.display()))?;
        serde_json::from_str::<RegistryDoc>(&text)
            .with_context(|| format!("parse {}", path.display()))?
    } else {
        debug!(path = %path.display(), "no registry yet, starting from skeleton");
        marketplace.empty_registry()
    };

    let mut by_name: BTreeMap<String, RegistryEntry> = registry
        .plugins
        .drain(..)
        .map(|entry| (entry.name.clone(), entry))
        .collect();

    for meta in synced {
        by_name.insert(
            meta.name.clone(),
            RegistryEntry {
                name: meta.name.clone(),
                source: format!("./plugins/{}", meta.name),
                description: meta.persisted_description(),
            },
        );
    }

    registry.plugins = by_name.into_values().collect();
    write_atomic(&path, &registry)
}

/// Pretty-printed JSON with a trailing newline, written via temp + rename.
fn write_atomic(path: &Path, registry: &RegistryDoc) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    let tmp = path.with_extension("json.tmp");
    let mut text = serde_json::to_string_pretty(registry)?;
    text.push('\n');
    std::fs::write(&tmp, text).with_context(|| format!("write {}", tmp.display()))?;
    std::fs::rename(&tmp, path).with_context(|| format!("rename to {}", path.display()))?;
    Ok(())
}
