use std::path::PathBuf;

use tracing::info;

use crate::{
    mirror, plugin, registry,
    types::{EXCLUDED_TREE_NAMES, Marketplace, SkillMeta},
    validate,
};

/// A consumption target for authored skills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SyncTarget {
    /// Claude plugin marketplace: mirrored tree + plugin metadata + registry.
    Claude,
    /// Codex skills directory: plain mirrored tree, no metadata.
    Codex,
}

impl std::fmt::Display for SyncTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Claude => write!(f, "claude"),
            Self::Codex => write!(f, "codex"),
        }
    }
}

/// Everything a sync or validate run needs to know.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub marketplace: Marketplace,
    pub codex_home: PathBuf,
    pub targets: Vec<SyncTarget>,
}

impl SyncOptions {
    fn wants(&self, target: SyncTarget) -> bool {
        self.targets.contains(&target)
    }

    /// Codex mirror destination for one skill.
    fn codex_skill_dir(&self, name: &str) -> PathBuf {
        self.codex_home.join("skills").join(name)
    }
}

/// Resolve the Codex home directory: explicit override, then `CODEX_HOME`,
/// then `~/.codex`.
pub fn resolve_codex_home(override_path: Option<PathBuf>) -> PathBuf {
    if let Some(path) = override_path {
        return path;
    }
    if let Ok(home) = std::env::var("CODEX_HOME")
        && !home.is_empty()
    {
        return PathBuf::from(home);
    }
    dirs_next::home_dir()
        .map(|home| home.join(".codex"))
        .unwrap_or_else(|| PathBuf::from(".codex"))
}

/// Sync every skill in the batch into the requested targets.
///
/// Claude gets a mirrored tree plus plugin metadata per skill and one
/// registry reconcile per non-empty batch; Codex gets the mirrored tree
/// only. Skills are processed sequentially in the order given (discovery
/// sorts by name).
pub fn run_sync(opts: &SyncOptions, skills: &[SkillMeta]) -> anyhow::Result<()> {
    if opts.wants(SyncTarget::Claude) {
        for meta in skills {
            let dest = opts.marketplace.plugin_skill_dir(&meta.name);
            mirror::mirror_tree(&meta.source_dir, &dest, EXCLUDED_TREE_NAMES)?;
            plugin::write_plugin_metadata(&opts.marketplace, meta)?;
            info!(
                target_name = "claude",
                skill = %meta.name,
                from = %meta.source_dir.display(),
                to = %dest.display(),
                "synced skill"
            );
        }
        if !skills.is_empty() {
            registry::reconcile_registry(&opts.marketplace, skills)?;
            info!(
                registry = %opts.marketplace.registry_path().display(),
                "updated registry"
            );
        }
    }

    if opts.wants(SyncTarget::Codex) {
        for meta in skills {
            let dest = opts.codex_skill_dir(&meta.name);
            mirror::mirror_tree(&meta.source_dir, &dest, EXCLUDED_TREE_NAMES)?;
            info!(
                target_name = "codex",
                skill = %meta.name,
                to = %dest.display(),
                "synced skill"
            );
        }
    }

    Ok(())
}

/// Validate generated trees against their sources for every requested
/// target.
///
/// Divergence is collected, not fatal: the caller gets the complete picture
/// for all skills and targets in one pass. An empty vec means everything is
/// in sync.
pub fn run_validate(opts: &SyncOptions, skills: &[SkillMeta]) -> anyhow::Result<Vec<String>> {
    let mut errors = Vec::new();

    for meta in skills {
        if opts.wants(SyncTarget::Claude) {
            let dest = opts.marketplace.plugin_skill_dir(&meta.name);
            errors.extend(validate::validate_tree(
                meta,
                &dest,
                "claude marketplace plugin",
                EXCLUDED_TREE_NAMES,
            )?);
        }
        if opts.wants(SyncTarget::Codex) {
            let dest = opts.codex_skill_dir(&meta.name);
            errors.extend(validate::validate_tree(
                meta,
                &dest,
                "codex skills dir",
                EXCLUDED_TREE_NAMES,
            )?);
        }
    }

    Ok(errors)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::{discover::discover_skills, types::EXCLUDED_SOURCE_DIRS};

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    fn author_review_pr(root: &Path) {
        write(
            &root.join("review-pr/SKILL.md"),
            "---\nname: review-pr\ndescription: Reviews a pull request.\n---\n\nInstructions.\n",
        );
        write(&root.join("review-pr/checklist.md"), "- item one\n");
    }

    fn options(root: &Path, targets: Vec<SyncTarget>) -> SyncOptions {
        SyncOptions {
            marketplace: Marketplace::new(root.join("my-marketplace")),
            codex_home: root.join("codex-home"),
            targets,
        }
    }

    #[test]
    fn sync_then_validate_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        author_review_pr(tmp.path());

        let skills = discover_skills(tmp.path(), EXCLUDED_SOURCE_DIRS, None).unwrap();
        assert_eq!(skills.len(), 1);

        let opts = options(tmp.path(), vec![SyncTarget::Claude, SyncTarget::Codex]);
        run_sync(&opts, &skills).unwrap();

        let plugin_dir = opts.marketplace.plugin_dir("review-pr");
        assert!(plugin_dir.join("skills/review-pr/checklist.md").is_file());
        let descriptor: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(plugin_dir.join(".claude-plugin/plugin.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(descriptor["name"], "review-pr");
        assert_eq!(descriptor["version"], "1.0.0");

        assert!(
            opts.codex_home
                .join("skills/review-pr/checklist.md")
                .is_file()
        );
        assert!(!opts.codex_home.join("skills/review-pr/.claude-plugin").exists());

        let errors = run_validate(&opts, &skills).unwrap();
        assert!(errors.is_empty(), "unexpected: {errors:?}");
    }

    #[test]
    fn validate_reports_deleted_generated_file() {
        let tmp = tempfile::tempdir().unwrap();
        author_review_pr(tmp.path());

        let skills = discover_skills(tmp.path(), EXCLUDED_SOURCE_DIRS, None).unwrap();
        let opts = options(tmp.path(), vec![SyncTarget::Claude]);
        run_sync(&opts, &skills).unwrap();

        std::fs::remove_file(
            opts.marketplace
                .plugin_skill_dir("review-pr")
                .join("checklist.md"),
        )
        .unwrap();

        let errors = run_validate(&opts, &skills).unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("[review-pr]"));
        assert!(errors[0].contains("missing files"));
        assert!(errors[0].contains("checklist.md"));
    }

    #[test]
    fn validate_before_sync_reports_missing_directories() {
        let tmp = tempfile::tempdir().unwrap();
        author_review_pr(tmp.path());

        let skills = discover_skills(tmp.path(), EXCLUDED_SOURCE_DIRS, None).unwrap();
        let opts = options(tmp.path(), vec![SyncTarget::Claude, SyncTarget::Codex]);

        let errors = run_validate(&opts, &skills).unwrap();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("claude marketplace plugin"));
        assert!(errors[1].contains("codex skills dir"));
    }

    #[test]
    fn codex_only_sync_leaves_marketplace_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        author_review_pr(tmp.path());

        let skills = discover_skills(tmp.path(), EXCLUDED_SOURCE_DIRS, None).unwrap();
        let opts = options(tmp.path(), vec![SyncTarget::Codex]);
        run_sync(&opts, &skills).unwrap();

        assert!(!opts.marketplace.root.exists());
        assert!(opts.codex_home.join("skills/review-pr/SKILL.md").is_file());
    }

    #[test]
    fn empty_batch_writes_no_registry() {
        let tmp = tempfile::tempdir().unwrap();
        let opts = options(tmp.path(), vec![SyncTarget::Claude]);

        run_sync(&opts, &[]).unwrap();

        assert!(!opts.marketplace.registry_path().exists());
    }

    #[test]
    fn resync_after_source_edit_converges() {
        let tmp = tempfile::tempdir().unwrap();
        author_review_pr(tmp.path());

        let skills = discover_skills(tmp.path(), EXCLUDED_SOURCE_DIRS, None).unwrap();
        let opts = options(tmp.path(), vec![SyncTarget::Claude]);
        run_sync(&opts, &skills).unwrap();

        write(&tmp.path().join("review-pr/checklist.md"), "- item two\n");
        assert!(!run_validate(&opts, &skills).unwrap().is_empty());

        run_sync(&opts, &skills).unwrap();
        assert!(run_validate(&opts, &skills).unwrap().is_empty());
    }

    #[test]
    fn explicit_override_wins_codex_home_resolution() {
        let resolved = resolve_codex_home(Some(PathBuf::from("/custom/codex")));
        assert_eq!(resolved, PathBuf::from("/custom/codex"));
    }
}
