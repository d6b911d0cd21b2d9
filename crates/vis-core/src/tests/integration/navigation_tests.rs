use super::common::{classes, project};
use crate::kernel::constants;
use crate::kernel::error::{Error, Result};
use crate::navigation::{MenuComposer, NavigationError, Position};
use crate::plugin_system::loader::KernelPluginLoader;

async fn boot(enabled: &[&str]) -> Result<(super::common::Project, KernelPluginLoader)> {
    let project = project();
    for name in enabled {
        project.service.enable(name).await?;
    }
    let config = project.config();
    let mut loader = KernelPluginLoader::from_config(&config, classes());
    loader.initialize(&config.project_root).await?;
    Ok((project, loader))
}

#[tokio::test]
async fn test_contributions_across_plugins_attach() -> Result<()> {
    let (project, loader) = boot(&["Reports", "Inbox"]).await?;

    let mut composer = MenuComposer::new(project.config().navigation, [constants::ROLE_USER]);
    composer.collect_from(loader.registry())?;
    composer.set_tool("main")?;
    composer.set_route("main", "inbox-monthly")?;

    let inbox = &composer.sidebar("main")[0];
    assert_eq!(inbox.id(), "inbox");
    assert!(inbox.base.active);
    assert!(inbox.child("monthly").is_some_and(|item| item.base.active));
    assert_eq!(composer.topbar("main", Position::Start)[0].id(), "compose");
    Ok(())
}

#[tokio::test]
async fn test_missing_parent_plugin_fails_collection() -> Result<()> {
    let (project, loader) = boot(&["Reports"]).await?;

    let mut composer = MenuComposer::new(project.config().navigation, [constants::ROLE_USER]);
    let err = composer.collect_from(loader.registry()).unwrap_err();
    assert!(matches!(
        err,
        Error::Navigation(NavigationError::ParentNotFound(ref id)) if id == "inbox"
    ));
    Ok(())
}
