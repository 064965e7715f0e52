use anyhow::{Context, Result};
use bitstash::areas::git_cli::GitCli;
use bitstash::areas::session::{
    DEFAULT_HARD_CEILING, DEFAULT_SOFT_THRESHOLD, DEFAULT_WORKERS, SessionConfig, Thresholds,
};
use bitstash::areas::stash::Stash;
use bitstash::artifacts::branch::branch_name::{BranchName, DEFAULT_BRANCH};
use bitstash::artifacts::push::retry::DEFAULT_MAX_ATTEMPTS;
use bitstash::artifacts::size::ByteSize;
use bitstash::artifacts::targets::{DEFAULT_TARGETS_FILE, TargetList};
use clap::{Args, Parser, Subcommand};
use is_terminal::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "bitstash",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "Back up directories into a size-limited git remote",
    long_about = "Back up a list of paths into a git remote that limits the size of a push. \
    Directories too large for a single push are split into groups of siblings, \
    each group is committed and force-pushed on its own with bounded retries.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Log more (-v debug, -vv trace)")]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ThresholdArgs {
    #[arg(
        long,
        env = "BITSTASH_SOFT_THRESHOLD",
        default_value_t = DEFAULT_SOFT_THRESHOLD,
        help = "Directories above this size are split into several pushes"
    )]
    soft_threshold: ByteSize,

    #[arg(
        long,
        env = "BITSTASH_HARD_CEILING",
        default_value_t = DEFAULT_HARD_CEILING,
        help = "Paths above this size are never pushed (the remote's upload limit)"
    )]
    hard_ceiling: ByteSize,
}

impl ThresholdArgs {
    fn thresholds(&self) -> Result<Thresholds> {
        Thresholds::new(self.soft_threshold, self.hard_ceiling)
    }
}

#[derive(Args)]
struct TargetArgs {
    #[arg(
        short,
        long,
        env = "BITSTASH_TARGETS",
        default_value = DEFAULT_TARGETS_FILE,
        help = "File listing the paths to back up, one per line"
    )]
    targets: PathBuf,
}

impl TargetArgs {
    fn load(&self) -> Result<TargetList> {
        let list = TargetList::load(&self.targets, &home_dir()?)?;
        if list.is_empty() {
            tracing::warn!("{} does not list any target", self.targets.display());
        }
        Ok(list)
    }
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "backup",
        about = "Back up every target to the remote",
        long_about = "This command creates a temporary repository in the work tree, \
        pushes every target in commit-sized groups and removes the repository again."
    )]
    Backup {
        #[arg(short, long, env = "BITSTASH_REMOTE", help = "URL of the git remote")]
        remote: String,

        #[command(flatten)]
        targets: TargetArgs,

        #[command(flatten)]
        thresholds: ThresholdArgs,

        #[arg(
            long,
            env = "BITSTASH_MAX_PUSH_ATTEMPTS",
            default_value_t = DEFAULT_MAX_ATTEMPTS,
            help = "Push attempts per group before giving up on it"
        )]
        max_push_attempts: u32,

        #[arg(
            long,
            env = "BITSTASH_RETRY_BACKOFF_MS",
            default_value_t = 0,
            help = "Delay between push attempts, in milliseconds"
        )]
        retry_backoff_ms: u64,

        #[arg(short, long, env = "BITSTASH_BRANCH", default_value = DEFAULT_BRANCH, help = "Remote branch to force-push")]
        branch: BranchName,

        #[arg(
            long,
            env = "BITSTASH_WORK_TREE",
            help = "Directory the temporary repository is created in [default: $HOME]"
        )]
        work_tree: Option<PathBuf>,

        #[arg(
            short,
            long,
            env = "BITSTASH_WORKERS",
            default_value_t = DEFAULT_WORKERS,
            help = "Targets sized and split in parallel"
        )]
        workers: usize,

        #[arg(long = "seed", value_name = "FILE", help = "File staged with the first push, e.g. a .gitattributes")]
        seed_files: Vec<PathBuf>,
    },
    #[command(
        name = "plan",
        about = "Show the pushes a backup would make",
        long_about = "This command splits every target exactly like a backup would \
        and prints the resulting groups with their sizes, without running git."
    )]
    Plan {
        #[command(flatten)]
        targets: TargetArgs,

        #[command(flatten)]
        thresholds: ThresholdArgs,
    },
    #[command(
        name = "size",
        about = "Print the size of files and directories",
        long_about = "This command prints the size of each path, directories being \
        the sum of everything below them. Symbolic links are not followed."
    )]
    Size {
        #[arg(long, help = "Print exact byte counts")]
        bytes: bool,

        #[arg(index = 1, required = true)]
        paths: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let mut stash = Stash::new(Box::new(std::io::stdout()));

    match cli.command {
        Commands::Backup {
            remote,
            targets,
            thresholds,
            max_push_attempts,
            retry_backoff_ms,
            branch,
            work_tree,
            workers,
            seed_files,
        } => {
            let work_tree = match work_tree {
                Some(path) => path,
                None => home_dir()?,
            };
            let config = SessionConfig {
                remote,
                soft_threshold: thresholds.soft_threshold,
                hard_ceiling: thresholds.hard_ceiling,
                max_push_attempts,
                retry_backoff: Duration::from_millis(retry_backoff_ms),
                branch,
                work_tree,
                workers,
                seed_files: seed_files
                    .iter()
                    .map(|seed| absolute(seed))
                    .collect::<Result<Vec<_>>>()?,
            };
            let session = config
                .build(chrono::Local::now())
                .context("Invalid backup configuration")?;
            let targets = targets.load()?;

            let backend = GitCli::new(session.workspace().clone());
            stash.backup(Arc::new(session), backend, &targets).await?;
        }
        Commands::Plan {
            targets,
            thresholds,
        } => {
            let thresholds = thresholds.thresholds()?;
            stash.plan(thresholds, &targets.load()?)?;
        }
        Commands::Size { bytes, paths } => stash.size(&paths, bytes)?,
    }

    Ok(())
}

fn setup_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("bitstash=info,warn")),
        1 => EnvFilter::new("bitstash=debug,info"),
        _ => EnvFilter::new("bitstash=trace,debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn home_dir() -> Result<PathBuf> {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .context("HOME is not set")
}

fn absolute(path: &Path) -> Result<PathBuf> {
    path.canonicalize()
        .with_context(|| format!("Failed to resolve {}", path.display()))
}
