//! # Core Dashboard
//!
//! First-party plugin contributing the `dashboard` tool. Hosts link it
//! statically and call [`register`] before booting the plugin loader.
mod dashboard_plugin;

pub use dashboard_plugin::{DashboardPlugin, TOOL_ID, WIDGETS_SERVICE_ID};

use vis_core::ClassRegistry;

/// Class name the plugin is declared under in its `plugin.json`
pub const CLASS: &str = "Vis::Dashboard::DashboardPlugin";

/// Register the plugin constructor with the host's class registry
pub fn register(classes: &mut ClassRegistry) {
    classes.register_plugin(CLASS, |args| Box::new(DashboardPlugin::new(args)));
}
