//! # Vis Core Navigation
//!
//! Menu model ([`Tool`], [`TopbarItem`], [`SidebarItem`]) and the
//! [`MenuComposer`] that active plugins contribute to.
pub mod composer;
pub mod error;
pub mod item;
pub mod tool;

pub use composer::{sort_items, MenuComposer, Navigation, RouteEntry, ToolNavigation};
pub use error::NavigationError;
pub use item::{ItemKind, MenuItem, PendingAttach, Position, SidebarItem, TopbarItem};
pub use tool::Tool;

#[cfg(test)]
mod tests;
