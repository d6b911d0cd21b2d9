use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Vis: plugin kernel and navigation composer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Project root the plugins directory and manifest resolve against
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    /// Configuration file (json, yaml or toml); defaults to <project>/vis.toml if present
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage plugins
    Plugin {
        #[command(subcommand)]
        command: PluginCommand,
    },
    /// Print the navigation of the active plugins as JSON
    Menu {
        /// Viewer role, may be repeated; ROLE_USER is always included
        #[arg(long = "role")]
        roles: Vec<String>,
        /// Tool to mark as current
        #[arg(long)]
        tool: Option<String>,
        /// Dash-delimited route to mark active, requires --tool
        #[arg(long, requires = "tool")]
        route: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum PluginCommand {
    /// List plugins of the persisted manifest
    List {
        /// Only show the plugin with this name
        #[arg(long)]
        name: Option<String>,
    },
    /// List plugins found in the plugins directory
    Discover,
    /// Enable a plugin (persist setting)
    Enable {
        /// The name of the plugin directory
        name: String,
    },
    /// Disable a plugin (persist setting)
    Disable {
        /// The name of the plugin directory
        name: String,
    },
    /// Rebuild the manifest from the plugins directory
    Rebuild,
}
