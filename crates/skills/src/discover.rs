use std::path::Path;

use {anyhow::Context, tracing::debug};

use crate::{parse, types::SkillMeta};

/// Enumerate authoring subdirectories containing a SKILL.md descriptor.
///
/// Immediate children of `root` only. Directories named in `excluded` and
/// directories without a descriptor are skipped silently. A descriptor that
/// fails to parse aborts discovery — sync never proceeds on partial
/// metadata. `selected` keeps a skill iff its logical name or directory
/// name is listed; `None` keeps all. Results are sorted by logical name.
pub fn discover_skills(
    root: &Path,
    excluded: &[&str],
    selected: Option<&[String]>,
) -> anyhow::Result<Vec<SkillMeta>> {
    let mut skills = Vec::new();

    let entries = std::fs::read_dir(root)
        .with_context(|| format!("read authoring root {}", root.display()))?;
    for entry in entries {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let Some(dir_name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string)
        else {
            continue;
        };
        if excluded.contains(&dir_name.as_str()) {
            continue;
        }

        let skill_md = path.join("SKILL.md");
        if !skill_md.is_file() {
            continue;
        }

        let (name, description) = parse::parse_skill_file(&skill_md)?;
        if let Some(filter) = selected
            && !filter.iter().any(|s| s == &name || s == &dir_name)
        {
            debug!(%name, "skill not selected, skipping");
            continue;
        }

        skills.push(SkillMeta {
            dir_name,
            name,
            description,
            source_dir: path,
        });
    }

    skills.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(skills)
}
