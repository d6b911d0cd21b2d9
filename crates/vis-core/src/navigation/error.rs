//! # Vis Core Navigation Errors
//!
//! Contract violations raised while composing menus: references to tools,
//! routes or parents that were never registered, conflicting parent
//! declarations and malformed identifiers.
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("Unknown tool '{0}'")]
    UnknownTool(String),

    #[error("Route '{route}' is not registered for tool '{tool}'")]
    UnknownRoute { tool: String, route: String },

    #[error("parent {0} does not exist")]
    ParentNotFound(String),

    #[error("Sidebar item '{item}' declares parent '{declared}' but is added under '{explicit}'")]
    ParentConflict {
        item: String,
        declared: String,
        explicit: String,
    },

    #[error("Invalid identifier '{0}': expected one or more of [a-zA-Z0-9_]")]
    InvalidIdentifier(String),
}
