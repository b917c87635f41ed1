use std::path::Path;

use anyhow::{Context, bail};

/// Parse `name` and `description` out of SKILL.md frontmatter.
///
/// The header is the text between the leading `---` delimiter line and the
/// next `---`. Recognized keys are `name:` (required, single-line) and
/// `description:` (single-line, or a `>`/`|` block scalar whose continuation
/// lines are indented by at least two spaces). Unrecognized keys are
/// ignored; only the first occurrence of each key is honored.
pub fn parse_frontmatter(text: &str) -> anyhow::Result<(String, String)> {
    if !text.starts_with("---") {
        bail!("missing YAML frontmatter");
    }

    let mut parts = text.splitn(3, "---");
    parts.next();
    let (Some(header), Some(_body)) = (parts.next(), parts.next()) else {
        bail!("malformed YAML frontmatter");
    };

    let lines: Vec<&str> = header.lines().collect();
    let mut name: Option<String> = None;
    let mut description: Option<String> = None;

    let mut idx = 0;
    while idx < lines.len() {
        let stripped = lines[idx].trim();

        if name.is_none()
            && let Some(value) = stripped.strip_prefix("name:")
        {
            name = Some(value.trim().to_string());
            idx += 1;
            continue;
        }

        if description.is_none()
            && let Some(value) = stripped.strip_prefix("description:")
        {
            let raw = value.trim();
            if raw == ">" || raw == "|" {
                idx += 1;
                let mut block: Vec<&str> = Vec::new();
                while idx < lines.len() {
                    let line = lines[idx];
                    if !line.starts_with("  ") {
                        break;
                    }
                    let trimmed = line.trim();
                    if !trimmed.is_empty() {
                        block.push(trimmed);
                    }
                    idx += 1;
                }
                description = Some(block.join(" "));
                continue;
            }

            description = Some(raw.to_string());
            idx += 1;
            continue;
        }

        idx += 1;
    }

    let Some(name) = name.filter(|n| !n.is_empty()) else {
        bail!("frontmatter must include `name`");
    };

    Ok((name, description.unwrap_or_default()))
}

/// Read and parse a skill descriptor, attaching the file path to errors.
pub fn parse_skill_file(path: &Path) -> anyhow::Result<(String, String)> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read {}", path.display()))?;
    parse_frontmatter(&text).with_context(|| path.display().to_string())
}
