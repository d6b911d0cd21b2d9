mod cli;
mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use log::debug;

use vis_core::kernel::constants;
use vis_core::storage::{ProcessConsole, VisConfig};
use vis_core::{
    ClassRegistry, DefinitionContainer, Error, KernelPluginLoader, MenuComposer, PluginManifestEntry,
    PluginService, Result,
};

use cli::{CliArgs, Commands, PluginCommand};

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    if let Err(e) = logging::init(args.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: CliArgs) -> Result<()> {
    let config = load_config(args.project.as_deref(), args.config.as_deref())?;
    debug!("Project root: {}", config.project_root.display());

    // --- Statically registered plugin classes ---
    let mut classes = ClassRegistry::default();
    core_dashboard::register(&mut classes);

    match args.command {
        Commands::Plugin { command } => {
            let service = PluginService::new(
                config,
                classes,
                Arc::new(DefinitionContainer::new()),
                Arc::new(ProcessConsole::new()),
            );
            run_plugin_command(&service, command).await
        }
        Commands::Menu { roles, tool, route } => {
            print_menu(config, classes, roles, tool, route).await
        }
    }
}

/// `--config` wins, then `<project>/vis.toml`, then defaults. An explicit
/// `--project` overrides the root a config file declares.
fn load_config(project: Option<&Path>, config: Option<&Path>) -> Result<VisConfig> {
    let project_root = project.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
    let config_file = match config {
        Some(path) => Some(path.to_path_buf()),
        None => Some(project_root.join(constants::DEFAULT_CONFIG_FILE)).filter(|path| path.is_file()),
    };

    let mut loaded = match config_file {
        Some(path) => VisConfig::load(&path)?,
        None => VisConfig::for_project(&project_root),
    };
    if project.is_some() {
        loaded.project_root = project_root;
    }
    Ok(loaded)
}

async fn run_plugin_command(service: &PluginService, command: PluginCommand) -> Result<()> {
    match command {
        PluginCommand::List { name } => {
            let entries = service.list_manifest_entries(name.as_deref()).await?;
            if entries.is_empty() {
                println!("No plugins in manifest.");
            }
            print_entries(&entries);
        }
        PluginCommand::Discover => {
            let entries = service.discover_from_disk().await?;
            if entries.is_empty() {
                println!("No plugins found in {}.", service.config().plugins_path().display());
            }
            print_entries(&entries);
        }
        PluginCommand::Enable { name } => {
            if !service.enable(&name).await? {
                return Err(Error::Other(format!("No plugin named '{}' found", name)));
            }
            println!("Plugin '{}' enabled.", name);
        }
        PluginCommand::Disable { name } => {
            if !service.disable(&name).await? {
                return Err(Error::Other(format!("No plugin named '{}' found", name)));
            }
            println!("Plugin '{}' disabled.", name);
        }
        PluginCommand::Rebuild => {
            let entries = service.rebuild_manifest().await?;
            println!("Manifest rebuilt with {} plugin(s).", entries.len());
            print_entries(&entries);
        }
    }
    Ok(())
}

fn print_entries(entries: &[PluginManifestEntry]) {
    for entry in entries {
        let status = if entry.active { "Enabled" } else { "Disabled" };
        println!(
            "  - Name: {}, Class: {}, Version: {}, Status: {}",
            entry.display_name(),
            entry.class().unwrap_or("-"),
            entry.version.as_deref().unwrap_or("-"),
            status
        );
    }
}

async fn print_menu(
    config: VisConfig,
    classes: ClassRegistry,
    roles: Vec<String>,
    tool: Option<String>,
    route: Option<String>,
) -> Result<()> {
    let mut loader = KernelPluginLoader::from_config(&config, classes);
    loader.initialize(&config.project_root).await?;

    let viewer_roles = std::iter::once(constants::ROLE_USER.to_string()).chain(roles);
    let mut composer = MenuComposer::new(config.navigation.clone(), viewer_roles);
    composer.collect_from(loader.registry())?;

    if let Some(tool) = tool.as_deref() {
        composer.set_tool(tool)?;
        if let Some(route) = route.as_deref() {
            composer.set_route(tool, route)?;
        }
    }

    let navigation = composer.build();
    let json = serde_json::to_string_pretty(&navigation)
        .map_err(|e| Error::Other(format!("Failed to serialize navigation: {}", e)))?;
    println!("{}", json);
    Ok(())
}
