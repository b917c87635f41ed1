//! Skill sync engine: frontmatter parsing, discovery, tree mirroring,
//! marketplace metadata, registry reconciliation, and content validation.
//!
//! Skills are directories containing a `SKILL.md` file with YAML
//! frontmatter, authored in one place and published to consumption targets:
//! a Claude plugin marketplace and a Codex skills directory. Every sync is a
//! full replace driven by current frontmatter; the only state that survives
//! a re-sync is a previously published plugin version string.
//!
//! All I/O is synchronous and sequential. The registry file and plugin
//! descriptors are read-then-rewritten without locking, so concurrent runs
//! against the same marketplace root are not supported.

pub mod discover;
pub mod mirror;
pub mod parse;
pub mod plugin;
pub mod registry;
pub mod sync;
pub mod types;
pub mod validate;

pub use {
    discover::discover_skills,
    sync::{SyncOptions, SyncTarget, resolve_codex_home, run_sync, run_validate},
    types::{Marketplace, SkillMeta},
};
