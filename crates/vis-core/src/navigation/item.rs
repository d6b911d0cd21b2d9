use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::navigation::error::NavigationError;
use crate::navigation::tool::validate_identifier;

/// Separator of the segments in parent paths and active routes
pub const PATH_SEPARATOR: char = '-';

/// What a menu item renders as
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Link,
    Divider,
    DarkmodeToggle,
    LocaleSwitcher,
}

/// Fields shared by topbar and sidebar items
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    tool: String,
    id: String,
    pub kind: ItemKind,
    pub label: String,
    /// Ascending sort key; ties keep insertion order
    pub order: i32,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    pub roles: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub route_params: BTreeMap<String, String>,
}

impl MenuItem {
    pub fn new(tool: &str, id: &str, label: &str) -> Result<Self, NavigationError> {
        validate_identifier(tool)?;
        validate_identifier(id)?;
        Ok(Self {
            tool: tool.to_string(),
            id: id.to_string(),
            kind: ItemKind::Link,
            label: label.to_string(),
            order: 0,
            active: false,
            template: None,
            roles: BTreeSet::new(),
            route: None,
            route_params: BTreeMap::new(),
        })
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The route, if set and non-empty
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref().filter(|route| !route.is_empty())
    }
}

impl AsRef<MenuItem> for MenuItem {
    fn as_ref(&self) -> &MenuItem {
        self
    }
}

/// Where a topbar item sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Start,
    End,
}

/// An entry of the top navigation bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopbarItem {
    #[serde(flatten)]
    pub base: MenuItem,
    pub position: Position,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_filter: Option<String>,
}

impl TopbarItem {
    pub fn new(tool: &str, id: &str, label: &str) -> Result<Self, NavigationError> {
        Ok(Self {
            base: MenuItem::new(tool, id, label)?,
            position: Position::Start,
            content: None,
            content_filter: None,
        })
    }

    pub fn id(&self) -> &str {
        self.base.id()
    }

    pub fn with_kind(mut self, kind: ItemKind) -> Self {
        self.base.kind = kind;
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.base.order = order;
        self
    }

    pub fn with_route(mut self, route: &str) -> Self {
        self.base.route = Some(route.to_string());
        self
    }

    pub fn with_role(mut self, role: &str) -> Self {
        self.base.roles.insert(role.to_string());
        self
    }

    pub fn with_content(mut self, content: &str) -> Self {
        self.content = Some(content.to_string());
        self
    }
}

impl AsRef<MenuItem> for TopbarItem {
    fn as_ref(&self) -> &MenuItem {
        &self.base
    }
}

/// Queued attachment of a sidebar item below an ancestor chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAttach {
    /// Ids from the top-level item down to the direct parent
    pub parent_path: Vec<String>,
}

/// An entry of the sidebar tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarItem {
    #[serde(flatten)]
    pub base: MenuItem,
    /// Id of the direct parent, the last segment of the parent path
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<String>,
    children: Vec<SidebarItem>,
    #[serde(skip)]
    pending: Option<PendingAttach>,
}

impl SidebarItem {
    pub fn new(tool: &str, id: &str, label: &str) -> Result<Self, NavigationError> {
        Ok(Self {
            base: MenuItem::new(tool, id, label)?,
            parent: None,
            children: Vec::new(),
            pending: None,
        })
    }

    pub fn id(&self) -> &str {
        self.base.id()
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// The full dash-delimited parent path, if a parent is set
    pub fn parent_path(&self) -> Option<String> {
        self.pending
            .as_ref()
            .map(|pending| pending.parent_path.join(&PATH_SEPARATOR.to_string()))
    }

    /// Place the item below `path`, a dash-delimited chain of ancestor ids
    /// starting at a top-level item. An empty path clears the parent.
    ///
    /// The attachment itself happens when the composer applies pending
    /// attachments.
    pub fn set_parent(&mut self, path: &str) -> Result<(), NavigationError> {
        if path.is_empty() {
            self.parent = None;
            self.pending = None;
            return Ok(());
        }

        let parent_path: Vec<String> = path.split(PATH_SEPARATOR).map(str::to_string).collect();
        for segment in &parent_path {
            validate_identifier(segment)?;
        }
        self.parent = parent_path.last().cloned();
        self.pending = Some(PendingAttach { parent_path });
        Ok(())
    }

    pub fn with_parent(mut self, path: &str) -> Result<Self, NavigationError> {
        self.set_parent(path)?;
        Ok(self)
    }

    pub fn pending(&self) -> Option<&PendingAttach> {
        self.pending.as_ref()
    }

    pub(crate) fn take_pending(&mut self) -> Option<PendingAttach> {
        self.pending.take()
    }

    pub fn children(&self) -> &[SidebarItem] {
        &self.children
    }

    pub fn child(&self, id: &str) -> Option<&SidebarItem> {
        self.children.iter().find(|child| child.id() == id)
    }

    pub fn child_mut(&mut self, id: &str) -> Option<&mut SidebarItem> {
        self.children.iter_mut().find(|child| child.id() == id)
    }

    /// Insert or replace a child by id, keeping children ordered
    pub fn add_child(&mut self, child: SidebarItem) {
        upsert_sorted(&mut self.children, child, SidebarItem::id);
    }

    pub fn with_kind(mut self, kind: ItemKind) -> Self {
        self.base.kind = kind;
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.base.order = order;
        self
    }

    pub fn with_route(mut self, route: &str) -> Self {
        self.base.route = Some(route.to_string());
        self
    }

    pub fn with_role(mut self, role: &str) -> Self {
        self.base.roles.insert(role.to_string());
        self
    }

    pub fn with_template(mut self, template: &str) -> Self {
        self.base.template = Some(template.to_string());
        self
    }
}

impl AsRef<MenuItem> for SidebarItem {
    fn as_ref(&self) -> &MenuItem {
        &self.base
    }
}

/// Replace the item with the same key in place, or append it; then stable
/// sort by order
pub(crate) fn upsert_sorted<T, F>(items: &mut Vec<T>, item: T, key: F)
where
    T: AsRef<MenuItem>,
    F: Fn(&T) -> &str,
{
    match items.iter().position(|existing| key(existing) == key(&item)) {
        Some(index) => items[index] = item,
        None => items.push(item),
    }
    items.sort_by(crate::navigation::composer::sort_items);
}
