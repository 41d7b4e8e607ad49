//! Clap derive structures for the `wizly` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// wizly -- command-line companion for a Wizarr server
#[derive(Debug, Parser)]
#[command(
    name = "wizly",
    version,
    about = "Manage Wizarr invitations and users from the command line",
    long_about = "Query and manage a Wizarr media-server invitation manager.\n\n\
        Reads users, invitations, libraries, servers and API keys through the\n\
        Wizarr REST API and summarizes them into status views.",
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
    /// Server profile to use
    #[arg(long, short = 'p', env = "WIZLY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Wizarr base URL (overrides profile)
    #[arg(long, short = 'u', env = "WIZLY_URL", global = true)]
    pub url: Option<String>,

    /// Wizarr API key (overrides profile)
    #[arg(long, env = "WIZLY_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "WIZLY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "WIZLY_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "WIZLY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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
    /// Refresh every endpoint once and show the summary views
    #[command(alias = "st")]
    Status,

    /// Manage Wizarr users
    #[command(alias = "u")]
    Users(UsersArgs),

    /// Manage invitations
    #[command(alias = "inv", alias = "i")]
    Invitations(InvitationsArgs),

    /// View media libraries
    #[command(alias = "lib")]
    Libraries(ListOnlyArgs),

    /// View connected media servers
    Servers(ListOnlyArgs),

    /// View Wizarr API keys
    ApiKeys(ListOnlyArgs),

    /// Refresh periodically and print each summary
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Read-only resources ──────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListOnlyArgs {
    #[command(subcommand)]
    pub command: ListOnlyCommand,
}

#[derive(Debug, Subcommand)]
pub enum ListOnlyCommand {
    /// List all records
    #[command(alias = "ls")]
    List,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  USERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List users
    #[command(alias = "ls")]
    List,

    /// Delete a user
    #[command(alias = "rm")]
    Delete {
        /// User id
        id: String,
    },

    /// Extend a user's access
    #[command(group(
        clap::ArgGroup::new("extension").required(true).args(["days", "data"])
    ))]
    Extend {
        /// User id
        id: String,

        /// Days to extend by
        #[arg(long)]
        days: Option<u32>,

        /// Raw JSON extension body, sent as-is
        #[arg(long)]
        data: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  INVITATIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct InvitationsArgs {
    #[command(subcommand)]
    pub command: InvitationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum InvitationsCommand {
    /// List invitations with users and libraries resolved to names
    #[command(alias = "ls")]
    List,

    /// Create an invitation
    Create(CreateInvitationArgs),

    /// Create an invitation and email its link
    Email(EmailInvitationArgs),

    /// Delete an invitation
    #[command(alias = "rm")]
    Delete {
        /// Invitation id
        id: String,
    },
}

/// Fields shared by `invitations create` and `invitations email`.
#[derive(Debug, Args)]
pub struct CreateInvitationArgs {
    /// Comma-separated server ids (e.g. "1,2")
    #[arg(long, short = 's')]
    pub servers: String,

    /// Days until the invitation expires
    #[arg(long, short = 'e')]
    pub expires_in_days: Option<u32>,

    /// Access duration granted to the user (empty for unlimited)
    #[arg(long, short = 'd')]
    pub duration: Option<String>,

    /// Comma-separated library ids (default: all libraries)
    #[arg(long, short = 'l')]
    pub libraries: Option<String>,

    /// Allow downloads (`--allow-downloads=false` to deny explicitly)
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub allow_downloads: Option<bool>,

    /// Allow live TV (`--allow-live-tv=false` to deny explicitly)
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub allow_live_tv: Option<bool>,

    /// Allow mobile uploads (`--allow-mobile-uploads=false` to deny explicitly)
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub allow_mobile_uploads: Option<bool>,
}

#[derive(Debug, Args)]
pub struct EmailInvitationArgs {
    #[command(flatten)]
    pub invitation: CreateInvitationArgs,

    /// Recipient email address
    #[arg(long)]
    pub to: String,

    /// Public base URL for the invitation link (overrides profile)
    #[arg(long)]
    pub public_url: Option<String>,

    /// Email subject
    #[arg(long)]
    pub subject: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WATCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Refresh interval, e.g. "30s" or "2m" (minimum 10s)
    #[arg(long, short = 'i')]
    pub interval: Option<String>,
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

    /// Display current configuration (secrets masked)
    Show,

    /// Print the config file location
    Path,

    /// Store a secret in the system keyring
    SetKey {
        /// Profile name (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,

        /// Store the SMTP password instead of the API key
        #[arg(long)]
        smtp: bool,
    },

    /// Check that the active profile can reach Wizarr
    Test,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
