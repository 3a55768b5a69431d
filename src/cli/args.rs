//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Manage cloud projects, compute instances and document collections
#[derive(Parser, Debug)]
#[command(name = "skyctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (repeat for more: -d, -dd, -ddd)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    /// Project id, name or alias (default: the project file's default)
    #[arg(short = 'P', long, global = true)]
    pub project: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Directory holding the project file (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store tokens
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,
        /// Account password (or SKYCTL_PASSWORD)
        #[arg(long, env = "SKYCTL_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Server to log in to (default: configured server_url)
        #[arg(long)]
        server: Option<String>,
    },

    /// Forget stored tokens
    Logout,

    /// Show the logged-in account
    Whoami,

    /// Manage remote projects
    Projects {
        #[command(subcommand)]
        command: ProjectCommands,
    },

    /// Manage local project aliases
    Alias {
        #[command(subcommand)]
        command: AliasCommands,
    },

    /// Set the default project for this directory
    Use {
        /// Project id, name or alias
        project: String,
    },

    /// Manage compute instances
    Instances {
        #[command(subcommand)]
        command: InstanceCommands,
    },

    /// List document collections
    Collections {
        #[command(subcommand)]
        command: CollectionCommands,
    },

    /// Read documents
    Documents {
        #[command(subcommand)]
        command: DocumentCommands,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// List projects of the account
    #[command(alias = "ls")]
    List,

    /// Show the resolved project
    Show,

    /// Create a project
    Create {
        /// Canonical project name
        name: String,
        /// Human readable name
        #[arg(long)]
        display_name: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum AliasCommands {
    /// Map an alias to a project (first project added becomes the default)
    Add {
        /// Project id or canonical name
        project: String,
        /// Alias (default: the canonical name)
        #[arg(short, long)]
        alias: Option<String>,
    },

    /// Remove an alias (`default` clears the default)
    #[command(alias = "rm")]
    Remove {
        /// Alias to remove
        alias: String,
    },

    /// List aliases
    #[command(alias = "ls")]
    List,
}

#[derive(Subcommand, Debug)]
pub enum InstanceCommands {
    /// List instances
    #[command(alias = "ls")]
    List,

    /// Show one instance
    Show {
        /// Instance name
        name: String,
    },

    /// Start an instance
    Start {
        /// Instance name
        name: String,
    },

    /// Stop an instance
    Stop {
        /// Instance name
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CollectionCommands {
    /// List collections
    #[command(alias = "ls")]
    List,
}

#[derive(Subcommand, Debug)]
pub enum DocumentCommands {
    /// List documents in a collection
    #[command(alias = "ls")]
    List {
        /// Collection name
        collection: String,
        /// Maximum number of documents
        #[arg(short, long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..=1000))]
        limit: u32,
    },

    /// Print one document
    Get {
        /// Collection name
        collection: String,
        /// Document id
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create global config template
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show config paths
    Path,
}
