//! Clap derive structures for the `entman` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// entman -- manage Home Assistant entities and recorder retention
#[derive(Debug, Parser)]
#[command(
    name = "entman",
    version,
    about = "Manage Home Assistant entities from the command line",
    long_about = "Bulk-manage Home Assistant entities through the entity_manager integration.\n\n\
        Enable or disable registry entries, tune recorder retention and exclusion,\n\
        export entity lists and inspect the heaviest recorder entries.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "ENTMAN_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Home Assistant URL (overrides profile)
    #[arg(long, short = 'u', env = "ENTMAN_URL", global = true)]
    pub url: Option<String>,

    /// Long-lived access token
    #[arg(long, env = "ENTMAN_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ENTMAN_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, env = "ENTMAN_COLOR", default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', env = "ENTMAN_YES", global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "ENTMAN_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (default: profile, then 30)
    #[arg(long, env = "ENTMAN_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List and update individual entities
    #[command(alias = "ent", alias = "e")]
    Entities(EntitiesArgs),

    /// Apply one action to many entities in batches
    #[command(alias = "b")]
    Bulk(BulkArgs),

    /// Manage recorder settings per domain
    #[command(alias = "dom", alias = "d")]
    Domains(DomainsArgs),

    /// Save the filtered entity list as a text file
    Export(ExportArgs),

    /// Show the entities with the most recorded rows
    Report(ReportArgs),

    /// Recorder maintenance (exclusion config, purges, health check)
    Recorder(RecorderArgs),

    /// Check the integration and show entity statistics
    Status,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Filter Arguments ──────────────────────────────────────────

/// Entity filters shared by list, bulk and export commands.
///
/// Every flag left unset matches everything; set flags combine with AND.
#[derive(Debug, Default, Args)]
pub struct FilterArgs {
    /// Case-insensitive substring of the entity id or name
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Runtime state bucket
    #[arg(long, value_enum)]
    pub state: Option<StateFilter>,

    /// Exact integration (platform) name
    #[arg(long, short = 'i')]
    pub integration: Option<String>,

    /// Exact entity domain (e.g. sensor, light)
    #[arg(long)]
    pub domain: Option<String>,

    /// Registry status
    #[arg(long, value_enum)]
    pub status: Option<EnabledFilter>,

    /// Recorder membership
    #[arg(long, value_enum)]
    pub recorder: Option<RecorderFilter>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StateFilter {
    /// Any state other than the ones below
    Normal,
    Unavailable,
    Unknown,
    /// The literal state "disabled"
    Disabled,
    /// Missing or empty state
    NotProvided,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EnabledFilter {
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RecorderFilter {
    Excluded,
    Included,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ENTITIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct EntitiesArgs {
    #[command(subcommand)]
    pub command: EntitiesCommand,
}

#[derive(Debug, Subcommand)]
pub enum EntitiesCommand {
    /// List entities matching the filters
    #[command(alias = "ls")]
    List(FilterArgs),

    /// Enable entities in the registry
    Enable {
        /// Entity ids
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Disable entities in the registry
    Disable {
        /// Entity ids
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Exclude entities from the recorder
    Exclude {
        /// Entity ids
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Include entities in the recorder again
    Include {
        /// Entity ids
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Set recorder retention in days
    SetDays {
        /// Days of history to keep (0 = integration default)
        days: u32,

        /// Entity ids
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Permanently delete entities (destructive)
    #[command(alias = "rm")]
    Delete {
        /// Entity ids
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Drop recorded history of entities (destructive)
    Purge {
        /// Entity ids
        #[arg(required = true)]
        ids: Vec<String>,

        /// Purge even when the recorder reports pending writes
        #[arg(long)]
        force: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  BULK
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct BulkArgs {
    /// Action applied to every selected entity
    #[arg(value_enum)]
    pub action: BulkVerb,

    /// Retention for set-recorder-days
    #[arg(long)]
    pub days: Option<String>,

    /// Explicit entity ids (otherwise: everything the filters match)
    pub ids: Vec<String>,

    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BulkVerb {
    Enable,
    Disable,
    SetRecorderDays,
    ExcludeRecorder,
    IncludeRecorder,
    /// Permanently delete (destructive)
    Delete,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DOMAINS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DomainsArgs {
    #[command(subcommand)]
    pub command: DomainsCommand,
}

#[derive(Debug, Subcommand)]
pub enum DomainsCommand {
    /// List domains with recorder coverage
    #[command(alias = "ls")]
    List,

    /// Exclude a whole domain from the recorder
    Exclude {
        /// Domain name (e.g. sensor)
        domain: String,
    },

    /// Include a domain in the recorder again
    Include {
        /// Domain name
        domain: String,
    },

    /// Set domain-level retention in days
    SetDays {
        /// Days of history to keep (at least 1)
        days: u32,

        /// Domain name
        domain: String,
    },

    /// Apply one action to several domains
    Bulk {
        #[arg(value_enum)]
        action: DomainVerb,

        /// Retention for set-recorder-days
        #[arg(long)]
        days: Option<String>,

        /// Domain names
        #[arg(required = true)]
        domains: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DomainVerb {
    Exclude,
    Include,
    SetRecorderDays,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  EXPORT / REPORT / RECORDER
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Directory to write the export file into
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    /// Print the export to stdout instead of writing a file
    #[arg(long, conflicts_with = "out")]
    pub stdout: bool,

    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Number of entities the backend analyzes
    #[arg(long, short = 'l', default_value = "100")]
    pub limit: u32,

    /// Rows to display
    #[arg(long, default_value = "10")]
    pub top: usize,

    /// List the reported entities instead of record counts
    #[arg(long)]
    pub entities: bool,
}

#[derive(Debug, Args)]
pub struct RecorderArgs {
    #[command(subcommand)]
    pub command: RecorderCommand,
}

#[derive(Debug, Subcommand)]
pub enum RecorderCommand {
    /// Rewrite the recorder exclusion config from current exclusions
    UpdateConfig {
        /// Skip the backup of the previous configuration
        #[arg(long)]
        no_backup: bool,
    },

    /// Purge recorded history of every excluded entity (destructive)
    PurgeAll {
        /// Purge even when the recorder reports pending writes
        #[arg(long)]
        force: bool,
    },

    /// Ask the integration to reload its configuration
    Reload,

    /// Check that the recorder answers history queries
    Check,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store an access token in the system keyring
    SetToken {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
