use std::{ffi::OsStr, path::Path};

use {anyhow::Context, walkdir::WalkDir};

/// Replace `dest` with a filtered copy of `source`.
///
/// The previous destination subtree is deleted outright — sync is always a
/// full replace, never an incremental merge. Entries whose basename appears
/// in `excluded` are pruned at every depth. Any I/O failure propagates and
/// aborts the run.
pub fn mirror_tree(source: &Path, dest: &Path, excluded: &[&str]) -> anyhow::Result<()> {
    if dest.exists() {
        std::fs::remove_dir_all(dest)
            .with_context(|| format!("remove {}", dest.display()))?;
    }
    std::fs::create_dir_all(dest).with_context(|| format!("create {}", dest.display()))?;

    let walker = WalkDir::new(source)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| !is_excluded(entry.file_name(), excluded));

    for entry in walker {
        let entry = entry?;
        let relative = entry.path().strip_prefix(source)?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &target)
                .with_context(|| format!("copy {}", entry.path().display()))?;
        }
    }

    Ok(())
}

/// Whether a basename is in the exclusion set.
pub(crate) fn is_excluded(name: &OsStr, excluded: &[&str]) -> bool {
    name.to_str().is_some_and(|n| excluded.contains(&n))
}
