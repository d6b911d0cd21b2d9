/// Application name
pub const APP_NAME: &str = "Vis";

/// Name under which the host bundle itself is reported among active bundles
pub const HOST_BUNDLE_NAME: &str = "VisBundle";

/// Default plugins directory, relative to the project root
pub const DEFAULT_PLUGINS_DIR: &str = "plugins";

/// Persisted plugin manifest, inside the plugins directory
pub const MANIFEST_FILE_NAME: &str = "plugins.json";

/// Per-plugin package descriptor, at each plugin's root
pub const DESCRIPTOR_FILE_NAME: &str = "plugin.json";

/// Key of the plugin class inside the descriptor's `extra` section
pub const PLUGIN_CLASS_KEY: &str = "vis-plugin-class";

/// Default public web directory, relative to the project root
pub const DEFAULT_PUBLIC_DIR: &str = "public";

/// Directory below the public directory receiving mirrored plugin assets
pub const PUBLIC_PLUGINS_DIR: &str = "plugins";

/// Candidate static asset directories inside a plugin, first match wins
pub const PLUGIN_ASSET_DIRS: &[&str] = &["public", "assets/public"];

/// Default configuration file looked up in the project root
pub const DEFAULT_CONFIG_FILE: &str = "vis.toml";

/// Default source file extension used by the namespace loader
pub const DEFAULT_SOURCE_EXTENSION: &str = "rs";

/// Role every viewer carries and items default to
pub const ROLE_USER: &str = "ROLE_USER";

/// Tool ids owned by the host and refused by the composer
pub const RESERVED_TOOL_IDS: &[&str] = &["register", "login", "logout", "profile", "settings"];

/// Id of the synthesized dark mode toggle in the end topbar bucket
pub const DARKMODE_TOGGLE_ID: &str = "darkmode";

/// Id of the synthesized locale switcher in the end topbar bucket
pub const LOCALE_SWITCHER_ID: &str = "locale";
