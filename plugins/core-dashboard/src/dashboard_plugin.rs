use std::any::Any;

use async_trait::async_trait;
use log::info;

use vis_core::kernel::constants::ROLE_USER;
use vis_core::kernel::container::ServiceDefinition;
use vis_core::navigation::{ItemKind, Position};
use vis_core::plugin_system::PluginContext;
use vis_core::{KernelPlugin, MenuComposer, PluginArgs, Result, SidebarItem, Tool, TopbarItem, TypeKey};

/// Id of the tool the dashboard contributes
pub const TOOL_ID: &str = "dashboard";

/// Container service registered when the plugin is enabled
pub const WIDGETS_SERVICE_ID: &str = "vis.dashboard.widgets";

const ROLE_ADMIN: &str = "ROLE_ADMIN";

#[derive(Debug, Clone)]
pub struct DashboardPlugin {
    args: PluginArgs,
}

impl DashboardPlugin {
    pub fn new(args: PluginArgs) -> Self {
        Self { args }
    }
}

#[async_trait]
impl KernelPlugin for DashboardPlugin {
    fn name(&self) -> &str {
        "core-dashboard"
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
        info!("Activating {} from {}", self.name(), context.entry.path);
        if !context.container.has(WIDGETS_SERVICE_ID) {
            context
                .container
                .register(WIDGETS_SERVICE_ID, ServiceDefinition::new("Vis::Dashboard::WidgetRegistry"));
        }
        context.container.set_public(WIDGETS_SERVICE_ID, true);
        Ok(())
    }

    async fn update(&self, context: &PluginContext) -> Result<()> {
        info!(
            "Updated {} to version {}",
            self.name(),
            context.entry.version.as_deref().unwrap_or("unknown")
        );
        Ok(())
    }

    fn build_navigation(&self, composer: &mut MenuComposer) -> Result<()> {
        composer.add_tool(Tool::new(TOOL_ID, "Dashboard")?.with_role(ROLE_USER));

        composer.add_topbar_item(
            TopbarItem::new(TOOL_ID, "home", "Home")?
                .with_route("home")
                .with_order(0),
        );
        composer.add_topbar_item(
            TopbarItem::new(TOOL_ID, "search", "Search")?
                .with_position(Position::End)
                .with_content("dashboard/search.html")
                .with_order(50),
        );

        // Children first; the composer attaches them once the parents exist
        composer.add_sidebar_item(
            SidebarItem::new(TOOL_ID, "stats", "Statistics")?.with_route("stats"),
            "overview",
        )?;
        composer.add_sidebar_item(
            SidebarItem::new(TOOL_ID, "overview", "Overview")?
                .with_route("overview")
                .with_order(10),
            "",
        )?;
        composer.add_sidebar_item(
            SidebarItem::new(TOOL_ID, "admin_divider", "")?
                .with_kind(ItemKind::Divider)
                .with_order(80)
                .with_role(ROLE_ADMIN),
            "",
        )?;
        composer.add_sidebar_item(
            SidebarItem::new(TOOL_ID, "administration", "Administration")?
                .with_route("administration")
                .with_order(90)
                .with_role(ROLE_ADMIN),
            "",
        )?;
        composer.add_sidebar_item(
            SidebarItem::new(TOOL_ID, "users", "Users")?
                .with_route("users")
                .with_role(ROLE_ADMIN)
                .with_parent("administration")?,
            "",
        )?;
        Ok(())
    }
}
