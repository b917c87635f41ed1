use std::{collections::BTreeMap, path::Path};

use {
    anyhow::Context,
    sha2::{Digest, Sha256},
    walkdir::WalkDir,
};

use crate::{mirror::is_excluded, types::SkillMeta};

/// SHA-256 hex digest of one file's raw bytes.
fn file_digest(path: &Path) -> anyhow::Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Fingerprint every file under `base`, keyed by forward-slash relative path.
///
/// Directories are not fingerprinted; excluded basenames are pruned at any
/// depth. The map is ordered, so divergence reports come out sorted.
pub fn collect_fingerprints(
    base: &Path,
    excluded: &[&str],
) -> anyhow::Result<BTreeMap<String, String>> {
    let mut files = BTreeMap::new();

    let walker = WalkDir::new(base)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| !is_excluded(entry.file_name(), excluded));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(base)?;
        let key = relative.to_string_lossy().replace('\\', "/");
        files.insert(key, file_digest(entry.path())?);
    }

    Ok(files)
}

/// Compare a source skill tree against one generated destination.
///
/// A missing destination yields a single error; otherwise each non-empty
/// divergence class (missing / extra / changed) yields one aggregated error
/// line naming the affected relative paths. An empty vec means the trees
/// match in file set and content; modification times are irrelevant.
pub fn validate_tree(
    meta: &SkillMeta,
    destination: &Path,
    label: &str,
    excluded: &[&str],
) -> anyhow::Result<Vec<String>> {
    if !destination.exists() {
        return Ok(vec![format!(
            "[{}] missing generated directory ({label}): {}",
            meta.name,
            destination.display()
        )]);
    }

    let source_files = collect_fingerprints(&meta.source_dir, excluded)?;
    let generated_files = collect_fingerprints(destination, excluded)?;

    let missing: Vec<&str> = source_files
        .keys()
        .filter(|rel| !generated_files.contains_key(*rel))
        .map(String::as_str)
        .collect();
    let extra: Vec<&str> = generated_files
        .keys()
        .filter(|rel| !source_files.contains_key(*rel))
        .map(String::as_str)
        .collect();
    let changed: Vec<&str> = source_files
        .iter()
        .filter(|(rel, digest)| {
            generated_files
                .get(*rel)
                .is_some_and(|generated| generated != *digest)
        })
        .map(|(rel, _)| rel.as_str())
        .collect();

    let mut errors = Vec::new();
    if !missing.is_empty() {
        errors.push(format!(
            "[{}] missing files in {label}: {}",
            meta.name,
            missing.join(", ")
        ));
    }
    if !extra.is_empty() {
        errors.push(format!(
            "[{}] extra files in {label}: {}",
            meta.name,
            extra.join(", ")
        ));
    }
    if !changed.is_empty() {
        errors.push(format!(
            "[{}] changed file content in {label}: {}",
            meta.name,
            changed.join(", ")
        ));
    }

    Ok(errors)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::types::EXCLUDED_TREE_NAMES;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    fn meta_for(source_dir: PathBuf) -> SkillMeta {
        SkillMeta {
            dir_name: "demo".into(),
            name: "demo".into(),
            description: "a demo".into(),
            source_dir,
        }
    }

    #[test]
    fn identical_trees_produce_no_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("src");
        let dest = tmp.path().join("dest");
        write(&source.join("SKILL.md"), "content");
        write(&source.join("sub/extra.txt"), "more");
        write(&dest.join("SKILL.md"), "content");
        write(&dest.join("sub/extra.txt"), "more");

        let errors =
            validate_tree(&meta_for(source), &dest, "claude marketplace plugin", EXCLUDED_TREE_NAMES)
                .unwrap();
        assert!(errors.is_empty());
    }

    #[test]
    fn missing_destination_directory_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("src");
        write(&source.join("SKILL.md"), "content");

        let errors = validate_tree(
            &meta_for(source),
            &tmp.path().join("nope"),
            "codex skills dir",
            EXCLUDED_TREE_NAMES,
        )
        .unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("missing generated directory (codex skills dir)"));
        assert!(errors[0].starts_with("[demo]"));
    }

    #[test]
    fn missing_file_listed_by_relative_path() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("src");
        let dest = tmp.path().join("dest");
        write(&source.join("SKILL.md"), "content");
        write(&source.join("checklist.md"), "steps");
        write(&dest.join("SKILL.md"), "content");

        let errors =
            validate_tree(&meta_for(source), &dest, "claude marketplace plugin", EXCLUDED_TREE_NAMES)
                .unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("missing files"));
        assert!(errors[0].contains("checklist.md"));
    }

    #[test]
    fn extra_file_listed() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("src");
        let dest = tmp.path().join("dest");
        write(&source.join("SKILL.md"), "content");
        write(&dest.join("SKILL.md"), "content");
        write(&dest.join("leftover.txt"), "stale");

        let errors =
            validate_tree(&meta_for(source), &dest, "claude marketplace plugin", EXCLUDED_TREE_NAMES)
                .unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("extra files"));
        assert!(errors[0].contains("leftover.txt"));
    }

    #[test]
    fn changed_content_detected() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("src");
        let dest = tmp.path().join("dest");
        write(&source.join("sub/file.md"), "original");
        write(&dest.join("sub/file.md"), "tampered");

        let errors =
            validate_tree(&meta_for(source), &dest, "claude marketplace plugin", EXCLUDED_TREE_NAMES)
                .unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("changed file content"));
        assert!(errors[0].contains("sub/file.md"));
    }

    #[test]
    fn excluded_names_ignored_on_both_sides() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("src");
        let dest = tmp.path().join("dest");
        write(&source.join("SKILL.md"), "content");
        write(&source.join("__pycache__/mod.pyc"), "junk");
        write(&dest.join("SKILL.md"), "content");
        write(&dest.join(".DS_Store"), "junk");

        let errors =
            validate_tree(&meta_for(source), &dest, "claude marketplace plugin", EXCLUDED_TREE_NAMES)
                .unwrap();
        assert!(errors.is_empty());
    }

    #[test]
    fn multiple_divergences_aggregate_into_one_line_each() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("src");
        let dest = tmp.path().join("dest");
        write(&source.join("a.md"), "a");
        write(&source.join("b.md"), "b");
        write(&dest.join("b.md"), "B");

        let errors =
            validate_tree(&meta_for(source), &dest, "claude marketplace plugin", EXCLUDED_TREE_NAMES)
                .unwrap();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("missing files"));
        assert!(errors[1].contains("changed file content"));
    }
}
