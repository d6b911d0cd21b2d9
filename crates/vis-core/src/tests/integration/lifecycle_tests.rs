use std::fs;

use super::common::{classes, project, InboxPlugin, ReportsPlugin, CACHE_COMMAND};
use crate::kernel::constants;
use crate::kernel::container::{DefinitionContainer, ServiceContainer};
use crate::kernel::error::Result;
use crate::plugin_system::loader::{ActiveBundle, KernelPluginLoader};

#[tokio::test]
async fn test_enable_then_boot() -> Result<()> {
    let project = project();
    assert!(project.service.enable("Reports").await?);
    assert!(project.dir.path().join("plugins").join("plugins.json").is_file());

    // Activation side effects
    assert!(project.container.has("acme.reports.exporter"));
    assert_eq!(project.console.commands(), vec![CACHE_COMMAND]);
    let mirrored = project.config().public_assets_path("Reports").join("app.js");
    assert!(mirrored.is_file());

    // The next boot only activates the enabled plugin
    let config = project.config();
    let mut loader = KernelPluginLoader::from_config(&config, classes());
    loader.initialize(&config.project_root).await?;
    assert_eq!(loader.registry().len(), 1);
    assert!(loader.active_instance::<ReportsPlugin>().is_some());
    assert!(loader.active_instance::<InboxPlugin>().is_none());

    let mut loaded = Vec::new();
    let names: Vec<String> = loader
        .active_bundles(&mut loaded)
        .map(|bundle| bundle.name().to_string())
        .collect();
    assert_eq!(names, vec!["Reports".to_string(), constants::HOST_BUNDLE_NAME.to_string()]);

    let host = DefinitionContainer::new();
    loader.attach_to_container(&host);
    let id = std::any::type_name::<ReportsPlugin>();
    let definition = host.definition(id).unwrap();
    assert!(definition.autowired && definition.public);
    Ok(())
}

#[tokio::test]
async fn test_disable_removes_assets_and_unloads() -> Result<()> {
    let project = project();
    project.service.enable("Reports").await?;
    project.service.enable("Inbox").await?;
    assert!(project.service.disable("Reports").await?);

    assert!(!project.config().public_assets_path("Reports").exists());
    assert!(project.config().public_assets_path("Inbox").exists());

    let config = project.config();
    let mut loader = KernelPluginLoader::from_config(&config, classes());
    loader.initialize(&config.project_root).await?;

    let mut loaded = vec!["Inbox".to_string()];
    let bundles: Vec<ActiveBundle> = loader.active_bundles(&mut loaded).collect();
    assert_eq!(bundles.len(), 1);
    assert!(matches!(bundles[0], ActiveBundle::Host));
    Ok(())
}

#[tokio::test]
async fn test_rebuild_drops_vanished_plugins() -> Result<()> {
    let project = project();
    project.service.enable("Reports").await?;
    project.service.enable("Inbox").await?;

    fs::remove_dir_all(project.config().plugins_path().join("Inbox")).unwrap();
    let entries = project.service.rebuild_manifest().await?;

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "Reports");
    assert!(entries[0].active);
    assert_eq!(entries[0].version.as_deref(), Some("1.2.0"));
    assert_eq!(project.service.store().read_entries()?, entries);
    Ok(())
}
