//! CLI entry point for grove

use std::error::Error;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use glob::Pattern;
use serde::Serialize;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use grove::{
    ArenaTree, DirectoryTree, Direction, Edit, EditFormatter, FsConfig, FsTree, OutputConfig,
    ReconcileConfig, Restrictions, Snapshot, TreeFormatter, TreeProvider, TreeWalker, WalkFormatter,
    collect_visits, node_depth, print_json, read_snapshot, write_snapshot,
};

type CliResult = Result<(), Box<dyn Error>>;

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether to use color output based on mode and environment.
fn should_use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // Respect NO_COLOR environment variable (https://no-color.org/)
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            std::io::stdout().is_terminal()
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "grove")]
#[command(about = "Walk ordered trees and keep directory trees in sync")]
#[command(version)]
struct Cli {
    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto", global = true)]
    color: ColorMode,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk a directory or an outline file from a start node
    Walk(WalkArgs),
    /// Reconcile a directory tree view against the filesystem
    Sync(SyncArgs),
}

#[derive(Args, Debug)]
struct WalkArgs {
    /// Directory (or outline file with --outline) to walk
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Read PATH as an indented outline instead of a directory
    #[arg(long)]
    outline: bool,

    /// Start node: a path relative to PATH, or an outline key
    #[arg(long, value_name = "NODE")]
    from: Option<String>,

    /// Walk in reverse pre-order
    #[arg(long)]
    backward: bool,

    /// Names the walk may not leave (glob)
    #[arg(long, value_name = "GLOB")]
    root: Option<String>,

    /// Names returned but never descended into (glob)
    #[arg(long, value_name = "GLOB")]
    leaf: Option<String>,

    /// Only return names matching this glob
    #[arg(long, value_name = "GLOB")]
    visit: Option<String>,

    /// Treat nodes N levels deep as leaves
    #[arg(short = 'L', long = "level")]
    level: Option<usize>,

    /// Do not enter the start node's subtree
    #[arg(long)]
    skip_initial_subtree: bool,

    /// Do not return the start node's ancestors (backward walks)
    #[arg(long)]
    skip_initial_ancestry: bool,

    /// Show the phase of each visited node
    #[arg(long)]
    phase: bool,

    /// Output in JSON format
    #[arg(long)]
    json: bool,

    /// Show all files (ignore .gitignore and hidden-file filtering)
    #[arg(short, long)]
    all: bool,

    /// Ignore files matching pattern (can be used multiple times)
    #[arg(short = 'I', long = "ignore")]
    ignore: Vec<String>,

    /// List directories only
    #[arg(short = 'd', long = "dirs-only")]
    dirs_only: bool,
}

#[derive(Args, Debug)]
struct SyncArgs {
    /// Directory to show
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Start from a saved tree and reconcile it against the filesystem
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Save the resulting tree
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,

    /// Levels to expand on a fresh tree
    #[arg(long, value_name = "N", default_value = "1")]
    expand: usize,

    /// Directory names shown as groups only while non-empty (repeatable)
    #[arg(long = "group", value_name = "NAME")]
    group: Vec<String>,

    /// Give up on a directory listing after DURATION (e.g. 500ms, 2s)
    #[arg(long, value_name = "DURATION")]
    timeout: Option<String>,

    /// Only descend into expanded directories and collapse children with
    /// their parent
    #[arg(long)]
    delay_expansion: bool,

    /// Output in JSON format
    #[arg(long)]
    json: bool,

    /// Show all directories (ignore .gitignore and hidden-file filtering)
    #[arg(short, long)]
    all: bool,

    /// Ignore directories matching pattern (can be used multiple times)
    #[arg(short = 'I', long = "ignore")]
    ignore: Vec<String>,
}

/// Machine-readable result of `grove sync`.
#[derive(Serialize)]
struct SyncReport {
    edits: Vec<Edit<PathBuf>>,
    tree: Snapshot<PathBuf>,
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

/// Parse a duration string like "500ms" or "2s" with humantime.
fn parse_duration_string(s: &str) -> Result<Duration, String> {
    humantime::parse_duration(s.trim()).map_err(|e| e.to_string())
}

fn compile_glob(flag: &str, pattern: Option<&str>) -> Result<Option<Pattern>, String> {
    pattern
        .map(|p| Pattern::new(p).map_err(|e| format!("invalid --{} pattern '{}': {}", flag, p, e)))
        .transpose()
}

/// Resolve PATH to an absolute, existing path.
fn resolve_root(path: &Path) -> Result<PathBuf, String> {
    std::fs::canonicalize(path).map_err(|_| {
        format!(
            "cannot access '{}': No such file or directory",
            path.display()
        )
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let use_color = should_use_color(cli.color);

    let result = match &cli.command {
        Command::Walk(args) => run_walk(args, use_color),
        Command::Sync(args) => run_sync(args, use_color).await,
    };

    if let Err(e) = result {
        eprintln!("grove: {}", e);
        process::exit(1);
    }
}

fn run_walk(args: &WalkArgs, use_color: bool) -> CliResult {
    let output = OutputConfig {
        use_color: use_color && !args.json,
        show_phase: args.phase,
    };

    if args.outline {
        let text = std::fs::read_to_string(&args.path)
            .map_err(|e| format!("cannot read '{}': {}", args.path.display(), e))?;
        let tree = ArenaTree::from_outline(&text)?;
        let start = match &args.from {
            Some(key) => tree
                .find(key)
                .ok_or_else(|| format!("no node '{}' in outline", key))?,
            None => tree.root(),
        };
        return walk_tree(&tree, start, args, output, |key| key.clone());
    }

    let root = resolve_root(&args.path)?;
    let tree = FsTree::new(
        &root,
        FsConfig {
            show_all: args.all,
            dirs_only: args.dirs_only,
            ignore_patterns: args.ignore.clone(),
            group_names: Vec::new(),
        },
    );
    let start = match &args.from {
        Some(rel) => {
            let start = root.join(rel);
            if !start.exists() {
                return Err(format!("cannot access '{}': No such file or directory", rel).into());
            }
            start
        }
        None => root.clone(),
    };
    walk_tree(&tree, start, args, output, |key| tree.relative_label(key))
}

fn walk_tree<P: TreeProvider>(
    provider: &P,
    start: P::Node,
    args: &WalkArgs,
    output: OutputConfig,
    describe: impl Fn(&P::Key) -> String,
) -> CliResult {
    let root = compile_glob("root", args.root.as_deref())?;
    let leaf = compile_glob("leaf", args.leaf.as_deref())?;
    let visit = compile_glob("visit", args.visit.as_deref())?;
    let level = args.level;

    let mut restrictions = Restrictions::new()
        .skip_initial_subtree(args.skip_initial_subtree)
        .skip_initial_ancestry(args.skip_initial_ancestry);
    if let Some(pattern) = root {
        restrictions = restrictions.root(move |n: &P::Node| pattern.matches(&provider.label(n)));
    }
    if leaf.is_some() || level.is_some() {
        restrictions = restrictions.leaf(move |n: &P::Node| {
            leaf.as_ref().is_some_and(|p| p.matches(&provider.label(n)))
                || level.is_some_and(|l| node_depth(provider, n) >= l)
        });
    }
    if let Some(pattern) = visit {
        restrictions = restrictions.visit(move |n: &P::Node| pattern.matches(&provider.label(n)));
    }

    let direction = if args.backward {
        Direction::Backward
    } else {
        Direction::Forward
    };
    let walker = TreeWalker::new(provider, start, direction, restrictions);
    let visits = collect_visits(provider, walker, describe);

    if args.json {
        print_json(&visits)?;
    } else {
        WalkFormatter::new(output).print(&visits)?;
    }
    Ok(())
}

async fn run_sync(args: &SyncArgs, use_color: bool) -> CliResult {
    let root = resolve_root(&args.path)?;
    let fetch_timeout = args
        .timeout
        .as_deref()
        .map(parse_duration_string)
        .transpose()
        .map_err(|e| format!("invalid --timeout duration: {}", e))?;

    let tree = FsTree::new(
        &root,
        FsConfig {
            show_all: args.all,
            dirs_only: true,
            ignore_patterns: args.ignore.clone(),
            group_names: args.group.clone(),
        },
    );
    let config = ReconcileConfig {
        delay_expansion: args.delay_expansion,
        fetch_timeout,
    };

    let mut edits: Vec<Edit<PathBuf>> = Vec::new();
    let dir = match &args.snapshot {
        Some(path) => {
            let snapshot = read_snapshot(path)?;
            let mut dir = DirectoryTree::from_snapshot(tree, &root, snapshot, config)?;
            dir.refresh_expanded(&mut edits).await?;
            dir
        }
        None => {
            let entry = tree.root_entry();
            let mut dir = DirectoryTree::new(tree, entry, config);
            dir.redraw(false, &mut edits).await?;
            expand_levels(&mut dir, args.expand, &mut edits).await;
            dir
        }
    };

    if let Some(path) = &args.save {
        write_snapshot(path, &dir.snapshot())?;
    }

    if args.json {
        edits.retain(|e| e.is_structural());
        let report = SyncReport {
            edits,
            tree: dir.snapshot(),
        };
        print_json(&report)?;
        return Ok(());
    }

    let output = OutputConfig {
        use_color,
        show_phase: false,
    };
    let provider = dir.provider();
    EditFormatter::new(output.clone()).print(&edits, |key| provider.relative_label(key))?;
    println!();
    TreeFormatter::new(output).print(dir.tree())?;
    Ok(())
}

/// Expand every shown directory above depth `levels` on a fresh tree.
async fn expand_levels(
    dir: &mut DirectoryTree<FsTree>,
    levels: usize,
    edits: &mut Vec<Edit<PathBuf>>,
) {
    for depth in 1..levels {
        let items: Vec<_> = dir
            .tree()
            .preorder()
            .into_iter()
            .filter(|id| dir.tree().depth(*id) == depth)
            .collect();
        for item in items {
            if let Err(err) = dir.expand(item, edits).await {
                warn!(error = %err, "failed to expand directory");
            }
        }
    }
}
