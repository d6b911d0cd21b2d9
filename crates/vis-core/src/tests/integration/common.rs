use std::any::Any;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tempfile::{tempdir, TempDir};

use crate::kernel::constants;
use crate::kernel::container::{DefinitionContainer, ServiceDefinition};
use crate::kernel::error::Result;
use crate::navigation::{MenuComposer, SidebarItem, Tool, TopbarItem};
use crate::plugin_system::factory::{ClassRegistry, PluginArgs};
use crate::plugin_system::service::PluginService;
use crate::plugin_system::traits::{KernelPlugin, PluginContext, TypeKey};
use crate::storage::config::VisConfig;
use crate::tests::recording_console::RecordingConsole;

pub const REPORTS_CLASS: &str = "Acme::Reports::ReportsPlugin";
pub const INBOX_CLASS: &str = "Acme::Inbox::InboxPlugin";
pub const CACHE_COMMAND: &str = "cache:clear";

/// Contributes the `reports` tool; its sidebar item hangs below the inbox
#[derive(Debug)]
pub struct ReportsPlugin {
    args: PluginArgs,
}

/// Contributes the `inbox` sidebar root the reports plugin attaches to
#[derive(Debug)]
pub struct InboxPlugin {
    args: PluginArgs,
}

#[async_trait]
impl KernelPlugin for ReportsPlugin {
    fn name(&self) -> &str {
        "Reports"
    }

    fn is_active(&self) -> bool {
        self.args.active
    }

    fn path(&self) -> &str {
        &self.args.path
    }

    fn type_key(&self) -> TypeKey {
        TypeKey::of::<Self>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    async fn activate(&self, context: &PluginContext) -> Result<()> {
        context
            .container
            .register("acme.reports.exporter", ServiceDefinition::new("Acme::Reports::Exporter"));
        Ok(())
    }

    fn build_navigation(&self, composer: &mut MenuComposer) -> Result<()> {
        composer.add_tool(Tool::new("main", "Main")?);
        composer.add_sidebar_item(
            SidebarItem::new("main", "monthly", "Monthly reports")?.with_route("monthly"),
            "inbox",
        )?;
        Ok(())
    }
}

#[async_trait]
impl KernelPlugin for InboxPlugin {
    fn name(&self) -> &str {
        "Inbox"
    }

    fn is_active(&self) -> bool {
        self.args.active
    }

    fn path(&self) -> &str {
        &self.args.path
    }

    fn type_key(&self) -> TypeKey {
        TypeKey::of::<Self>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn build_navigation(&self, composer: &mut MenuComposer) -> Result<()> {
        composer.add_topbar_item(TopbarItem::new("main", "compose", "Compose")?);
        composer.add_sidebar_item(
            SidebarItem::new("main", "inbox", "Inbox")?.with_route("inbox"),
            "",
        )?;
        Ok(())
    }
}

pub fn classes() -> ClassRegistry {
    let mut classes = ClassRegistry::default();
    classes.register_plugin(REPORTS_CLASS, |args| Box::new(ReportsPlugin { args }));
    classes.register_plugin(INBOX_CLASS, |args| Box::new(InboxPlugin { args }));
    classes
}

/// Lay out a plugin directory with descriptor, source file and public assets
pub fn write_plugin(project: &Path, name: &str, class: &str) {
    let (prefix, type_name) = class.rsplit_once("::").unwrap();
    let plugin_dir = project.join(constants::DEFAULT_PLUGINS_DIR).join(name);
    fs::create_dir_all(plugin_dir.join("src")).unwrap();
    fs::create_dir_all(plugin_dir.join("public")).unwrap();

    let descriptor = json!({
        "name": format!("acme/{}", name.to_lowercase()),
        "version": "1.2.0",
        "autoload": { "prefix": { (prefix): "src" } },
        "extra": { (constants::PLUGIN_CLASS_KEY): class, "label": name }
    });
    fs::write(
        plugin_dir.join(constants::DESCRIPTOR_FILE_NAME),
        serde_json::to_string_pretty(&descriptor).unwrap(),
    )
    .unwrap();

    let file = crate::plugin_system::module_loader::to_snake_case(type_name);
    fs::write(
        plugin_dir.join("src").join(format!("{file}.rs")),
        format!("pub struct {type_name};\n"),
    )
    .unwrap();
    fs::write(plugin_dir.join("public").join("app.js"), "// app").unwrap();
}

pub struct Project {
    pub dir: TempDir,
    pub container: Arc<DefinitionContainer>,
    pub console: Arc<RecordingConsole>,
    pub service: PluginService,
}

impl Project {
    pub fn config(&self) -> VisConfig {
        self.service.config().clone()
    }
}

/// A project holding the Reports and Inbox plugins, none enabled yet
pub fn project() -> Project {
    let dir = tempdir().unwrap();
    write_plugin(dir.path(), "Reports", REPORTS_CLASS);
    write_plugin(dir.path(), "Inbox", INBOX_CLASS);

    let mut config = VisConfig::for_project(dir.path());
    config.cache_clear_command = Some(CACHE_COMMAND.to_string());

    let container = Arc::new(DefinitionContainer::new());
    let console = Arc::new(RecordingConsole::new());
    let service = PluginService::new(config, classes(), container.clone(), console.clone());
    Project {
        dir,
        container,
        console,
        service,
    }
}
