use crate::paths::{DEFAULT_CONFIG_FILE, DEFAULT_STATE_FILE};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "persondb-provider")]
#[command(version)]
#[command(about = "Manage person records declaratively", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Desired configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// State file
    #[arg(short, long, global = true, default_value = DEFAULT_STATE_FILE)]
    pub state: PathBuf,

    /// Persons database (overrides provider.database_filename)
    #[arg(long, global = true)]
    pub database: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Refresh state and show what apply would change
    Plan(TargetArgs),

    /// Make the database match the configuration
    Apply(ApplyArgs),

    /// Delete every managed resource
    Destroy(DestroyArgs),

    /// Reconcile state with the database and save it
    Refresh(TargetArgs),

    /// Adopt an existing person into state
    Import {
        /// Address to import into, e.g. persondb_person.alice
        address: String,

        /// Identity of the existing record, e.g. /person/alice
        id: String,
    },

    /// Inspect or edit recorded state
    #[command(subcommand)]
    State(StateCommand),

    /// Evaluate data source blocks and print the results
    Read(TargetArgs),

    /// Print provider, resource and data source schemas as JSON
    Schema,

    /// Edit the persons database directly
    #[command(subcommand)]
    Db(DbCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Plan / Apply
// ============================================================================

#[derive(Parser)]
pub struct TargetArgs {
    /// Limit to a type or a single address, e.g. persondb_person.alice
    pub target: Option<String>,
}

#[derive(Parser)]
pub struct ApplyArgs {
    /// Limit to a type or a single address
    pub target: Option<String>,

    /// Show the plan without applying it
    #[arg(long)]
    pub dry_run: bool,

    /// Apply without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Parser)]
pub struct DestroyArgs {
    /// Limit to a type or a single address
    pub target: Option<String>,

    /// Destroy without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

// ============================================================================
// State Commands
// ============================================================================

#[derive(Subcommand)]
pub enum StateCommand {
    /// List managed addresses
    List,

    /// Show the recorded attributes of one address
    Show {
        address: String,
    },

    /// Forget an address without touching the database
    Rm {
        address: String,
    },
}

// ============================================================================
// Database Commands
// ============================================================================

#[derive(Subcommand)]
pub enum DbCommand {
    /// List every person in the database
    List,

    /// Show one person
    Get {
        person_id: String,
    },

    /// Create or overwrite a person
    Put {
        person_id: String,

        #[arg(long)]
        last_name: String,

        #[arg(long)]
        first_name: Option<String>,
    },

    /// Delete a person
    Rm {
        person_id: String,
    },
}
