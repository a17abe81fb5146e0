use crate::commands;
use crate::config::Config;
use anyhow::Result;
use apmec_api::{Apmec, ClientOptions, ReqwestTransport, WireFormat};
use apmec_core::resources::{MEAD, MECA, MECAD, MES, MESD, VIM};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "apmec")]
#[command(about = "CLI for the Apmec MEC orchestration service")]
#[command(version)]
pub struct Cli {
    /// Wire format for API requests
    #[arg(long, global = true, env = "APMEC_REQUEST_FORMAT", default_value = "json")]
    pub request_format: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage MEA descriptors
    Mead {
        #[command(subcommand)]
        action: DescriptorAction,
    },
    /// Manage MEA instances
    Mea {
        #[command(subcommand)]
        action: MeaAction,
    },
    /// Manage virtual infrastructure managers
    Vim {
        #[command(subcommand)]
        action: ResourceAction,
    },
    /// Manage MES descriptors
    Mesd {
        #[command(subcommand)]
        action: DescriptorAction,
    },
    /// Manage MES instances
    Mes {
        #[command(subcommand)]
        action: ResourceAction,
    },
    /// Manage MECA descriptors
    Mecad {
        #[command(subcommand)]
        action: DescriptorAction,
    },
    /// Manage MECA instances
    Meca {
        #[command(subcommand)]
        action: ResourceAction,
    },
    /// Inspect lifecycle events
    Event {
        #[command(subcommand)]
        action: ReadAction,
    },
    /// Inspect API extensions
    Extension {
        #[command(subcommand)]
        action: ReadAction,
    },
}

#[derive(Args)]
pub struct ListArgs {
    /// Page size for paginated listing
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Sort key, repeatable
    #[arg(long)]
    pub sort_key: Vec<String>,

    /// Sort direction (asc or desc), repeatable
    #[arg(long)]
    pub sort_dir: Vec<String>,

    /// Walk pages in reverse
    #[arg(long)]
    pub page_reverse: bool,

    /// Columns to display
    #[arg(long)]
    pub fields: Vec<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Resource ID
    pub id: String,

    /// Columns to display
    #[arg(long)]
    pub fields: Vec<String>,
}

#[derive(Args)]
pub struct CreateArgs {
    /// Inline JSON attributes
    #[arg(long, conflicts_with = "file")]
    pub attrs: Option<String>,

    /// YAML or JSON file with attributes
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Resource name
    #[arg(long)]
    pub name: Option<String>,

    /// Resource description
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Resource ID
    pub id: String,

    /// Inline JSON attributes
    #[arg(long, conflicts_with = "file")]
    pub attrs: Option<String>,

    /// YAML or JSON file with attributes
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Resource ID
    pub id: String,
}

#[derive(Subcommand)]
pub enum ResourceAction {
    /// List resources
    List(ListArgs),
    /// Show one resource
    Show(ShowArgs),
    /// Create a resource
    Create(CreateArgs),
    /// Update a resource
    Update(UpdateArgs),
    /// Delete a resource
    Delete(DeleteArgs),
}

/// Descriptors are immutable once onboarded - no update verb.
#[derive(Subcommand)]
pub enum DescriptorAction {
    /// List descriptors
    List(ListArgs),
    /// Show one descriptor
    Show(ShowArgs),
    /// Onboard a descriptor
    Create(CreateArgs),
    /// Delete a descriptor
    Delete(DeleteArgs),
}

#[derive(Subcommand)]
pub enum ReadAction {
    /// List entries
    List(ListArgs),
    /// Show one entry
    Show(ShowArgs),
}

#[derive(Subcommand)]
pub enum MeaAction {
    /// List MEAs
    List(ListArgs),
    /// Show one MEA
    Show(ShowArgs),
    /// Create a MEA
    Create(CreateArgs),
    /// Update a MEA
    Update(UpdateArgs),
    /// Delete a MEA
    Delete(DeleteArgs),
    /// Scale a MEA
    Scale {
        /// MEA ID
        id: String,
        /// Inline JSON scale body
        #[arg(long, conflicts_with = "file")]
        attrs: Option<String>,
        /// YAML or JSON file with the scale body
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// List infrastructure resources of a MEA
    Resources {
        /// MEA ID
        id: String,
    },
    /// List MEA lifecycle events
    Events(ListArgs),
}

pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    let sdk = build_sdk(&config, &cli.request_format)?;

    match cli.command {
        Commands::Mead { action } => commands::run_descriptor(&sdk, &MEAD, action),
        Commands::Mea { action } => commands::run_mea(&sdk, action),
        Commands::Vim { action } => commands::run_resource(&sdk, &VIM, action),
        Commands::Mesd { action } => commands::run_descriptor(&sdk, &MESD, action),
        Commands::Mes { action } => commands::run_resource(&sdk, &MES, action),
        Commands::Mecad { action } => commands::run_descriptor(&sdk, &MECAD, action),
        Commands::Meca { action } => commands::run_resource(&sdk, &MECA, action),
        Commands::Event { action } => commands::run_event(&sdk, action),
        Commands::Extension { action } => commands::run_extension(&sdk, action),
    }
}

fn build_sdk(config: &Config, request_format: &str) -> Result<Apmec> {
    let format: WireFormat = request_format.parse()?;
    let session = config.session_config()?;
    log::debug!(
        "Connecting to {} (format: {})",
        session.endpoint_url,
        format
    );
    let transport = ReqwestTransport::new(session)?;
    let options = ClientOptions {
        format,
        retries: config.retries()?,
        ..ClientOptions::default()
    };
    let sdk = Apmec::for_version(&config.api_version(), Box::new(transport), options)?;
    Ok(sdk)
}
