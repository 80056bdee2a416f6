use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the host provisioning engine.
#[derive(Parser, Debug)]
#[command(
    name = "hostkit",
    about = "Provision hosts: packages, dotfiles and user services",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Override repository root directory
    #[arg(long, global = true)]
    pub root: Option<std::path::PathBuf>,

    /// Act as this host instead of the detected hostname
    #[arg(long, global = true)]
    pub host: Option<String>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install modules (defaults to the modules configured for this host)
    Install(InstallOpts),
    /// Compare and sync tracked dotfiles
    Dotfiles(DotfilesOpts),
    /// Deploy and manage background services (defaults to deploying this host's services)
    Services(ServicesOpts),
    /// List installed zsh plugins
    Plugins,
    /// Validate configuration documents
    Check,
    /// Print shell completions
    Completions(CompletionsOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the per-command log file.
    #[must_use]
    pub const fn log_name(&self) -> &'static str {
        match self {
            Self::Install(_) => "install",
            Self::Dotfiles(_) => "dotfiles",
            Self::Services(_) => "services",
            Self::Plugins => "plugins",
            Self::Check => "check",
            Self::Completions(_) => "completions",
            Self::Version => "version",
        }
    }
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct InstallOpts {
    #[command(subcommand)]
    pub target: Option<InstallTarget>,
}

/// What `install` should run.
#[derive(Subcommand, Debug, Clone)]
pub enum InstallTarget {
    /// List available modules
    List,
    /// Install every module
    All,
    /// Install a single module by name
    Module {
        /// Module name
        name: String,
    },
}

/// Options for the `dotfiles` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct DotfilesOpts {
    #[command(subcommand)]
    pub action: DotfilesAction,
}

/// Dotfile operations.
#[derive(Subcommand, Debug, Clone)]
pub enum DotfilesAction {
    /// Show which dotfiles are missing or modified
    Status,
    /// Show differences between source and deployed dotfiles
    Diff,
    /// Copy source dotfiles over deployed ones
    Sync {
        /// Overwrite without taking backups
        #[arg(short, long)]
        force: bool,
        /// Create symlinks to the source instead of copies
        #[arg(short, long)]
        link: bool,
    },
}

/// Options for the `services` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ServicesOpts {
    #[command(subcommand)]
    pub action: Option<ServicesAction>,
}

/// Service operations.
#[derive(Subcommand, Debug, Clone)]
pub enum ServicesAction {
    /// Show service status for this host
    Status,
    /// Install and load a single service
    Load {
        /// Service name
        name: String,
    },
    /// Unload and remove a single service
    Unload {
        /// Service name
        name: String,
    },
    /// Print the generated service artifacts
    Show {
        /// Service name
        name: String,
    },
}

/// Options for the `completions` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct CompletionsOpts {
    /// Target shell
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
