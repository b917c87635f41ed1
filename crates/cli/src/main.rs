use std::path::PathBuf;

use {
    anyhow::Context,
    clap::{Parser, ValueEnum},
    skillsync_skills::{
        Marketplace, SyncOptions, SyncTarget, discover_skills, resolve_codex_home, run_sync,
        run_validate, types::EXCLUDED_SOURCE_DIRS,
    },
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(
    name = "skillsync",
    about = "Sync authoring-first skills to the Claude marketplace and Codex"
)]
struct Cli {
    /// Validate generated targets against sources instead of syncing.
    #[arg(long)]
    validate: bool,

    /// Skill names (or directory names) to sync/validate; default all.
    #[arg(long, num_args = 1.., value_name = "NAME")]
    skills: Option<Vec<String>>,

    /// Targets to sync/validate.
    #[arg(long, num_args = 1.., value_enum, default_values_t = [TargetArg::Claude, TargetArg::Codex])]
    targets: Vec<TargetArg>,

    /// Authoring root containing skill directories.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Marketplace root (default: <root>/my-marketplace).
    #[arg(long)]
    marketplace_root: Option<PathBuf>,

    /// Codex home directory (default: $CODEX_HOME or ~/.codex).
    #[arg(long)]
    codex_home: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TargetArg {
    Claude,
    Codex,
}

impl From<TargetArg> for SyncTarget {
    fn from(value: TargetArg) -> Self {
        match value {
            TargetArg::Claude => Self::Claude,
            TargetArg::Codex => Self::Codex,
        }
    }
}

impl std::fmt::Display for TargetArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Claude => write!(f, "claude"),
            Self::Codex => write!(f, "codex"),
        }
    }
}

/// Initialise tracing with an env-filter overridable via `RUST_LOG`.
fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_ansi(true))
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_telemetry(&cli);

    let root = std::fs::canonicalize(&cli.root)
        .with_context(|| format!("resolve authoring root {}", cli.root.display()))?;
    let marketplace_root = cli
        .marketplace_root
        .clone()
        .unwrap_or_else(|| root.join("my-marketplace"));
    let codex_home = resolve_codex_home(cli.codex_home.clone());

    let mut targets: Vec<SyncTarget> = cli.targets.iter().copied().map(Into::into).collect();
    targets.sort_unstable();
    targets.dedup();

    let skills = discover_skills(&root, EXCLUDED_SOURCE_DIRS, cli.skills.as_deref())?;
    if skills.is_empty() {
        eprintln!(
            "No source skills found. Expected skill roots with SKILL.md under {}.",
            root.display()
        );
        std::process::exit(1);
    }

    let opts = SyncOptions {
        marketplace: Marketplace::new(marketplace_root),
        codex_home,
        targets,
    };

    if cli.validate {
        let errors = run_validate(&opts, &skills)?;
        if !errors.is_empty() {
            eprintln!("Validation failed:");
            for err in &errors {
                eprintln!("  - {err}");
            }
            std::process::exit(1);
        }
        let summary = opts
            .targets
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        println!("Validation succeeded for targets: {summary}.");
        return Ok(());
    }

    run_sync(&opts, &skills)?;
    println!("Synced {} skill(s).", skills.len());
    Ok(())
}
