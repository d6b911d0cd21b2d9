//! Per-request composition of the navigation tree.
//!
//! A [`MenuComposer`] is created for one viewer. Active plugins add tools,
//! topbar items and sidebar items to it; sidebar items placed below an
//! ancestor chain are queued and attached by [`MenuComposer::apply_pending`],
//! so an item may be added before its parent.
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::kernel::constants;
use crate::kernel::error::Result;
use crate::navigation::error::NavigationError;
use crate::navigation::item::{
    upsert_sorted, ItemKind, MenuItem, PendingAttach, Position, SidebarItem, TopbarItem, PATH_SEPARATOR,
};
use crate::navigation::tool::Tool;
use crate::plugin_system::registry::PluginRegistry;
use crate::storage::config::NavigationSettings;

/// Default order of the synthesized dark mode toggle
pub const DARKMODE_TOGGLE_ORDER: i32 = 100;
/// Default order of the synthesized locale switcher
pub const LOCALE_SWITCHER_ORDER: i32 = 110;

/// Route registry record of an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    pub route: String,
    /// Direct parent id for sidebar items placed below another item
    pub parent: Option<String>,
}

#[derive(Debug, Default, Clone)]
struct TopbarBuckets {
    start: Vec<TopbarItem>,
    end: Vec<TopbarItem>,
}

impl TopbarBuckets {
    fn bucket(&self, position: Position) -> &Vec<TopbarItem> {
        match position {
            Position::Start => &self.start,
            Position::End => &self.end,
        }
    }

    fn bucket_mut(&mut self, position: Position) -> &mut Vec<TopbarItem> {
        match position {
            Position::Start => &mut self.start,
            Position::End => &mut self.end,
        }
    }
}

/// Stable comparator of menu items: ascending `order`
pub fn sort_items<T: AsRef<MenuItem>>(a: &T, b: &T) -> Ordering {
    a.as_ref().order.cmp(&b.as_ref().order)
}

/// Aggregates navigation contributions for one viewer
#[derive(Debug, Clone)]
pub struct MenuComposer {
    settings: NavigationSettings,
    viewer_roles: BTreeSet<String>,
    current_tool: Option<String>,
    tools: Vec<Tool>,
    topbar: BTreeMap<String, TopbarBuckets>,
    sidebar: BTreeMap<String, Vec<SidebarItem>>,
    routes: BTreeMap<String, BTreeMap<String, RouteEntry>>,
    pending: Vec<SidebarItem>,
}

impl MenuComposer {
    pub fn new<I, S>(settings: NavigationSettings, viewer_roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            settings,
            viewer_roles: viewer_roles.into_iter().map(Into::into).collect(),
            current_tool: None,
            tools: Vec::new(),
            topbar: BTreeMap::new(),
            sidebar: BTreeMap::new(),
            routes: BTreeMap::new(),
            pending: Vec::new(),
        }
    }

    pub fn viewer_roles(&self) -> &BTreeSet<String> {
        &self.viewer_roles
    }

    pub fn settings(&self) -> &NavigationSettings {
        &self.settings
    }

    /// Switch the current tool. The tool must have been added.
    pub fn set_tool(&mut self, id: &str) -> std::result::Result<(), NavigationError> {
        if !self.is_tool(id) {
            return Err(NavigationError::UnknownTool(id.to_string()));
        }
        self.current_tool = Some(id.to_string());
        Ok(())
    }

    pub fn is_tool(&self, id: &str) -> bool {
        self.tools.iter().any(|tool| tool.id() == id)
    }

    pub fn current_tool(&self) -> Option<&str> {
        self.current_tool.as_deref()
    }

    /// Tools in registration order
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn tool(&self, id: &str) -> Option<&Tool> {
        self.tools.iter().find(|tool| tool.id() == id)
    }

    /// Add a tool.
    ///
    /// Reserved ids are refused. A tool whose id is taken only replaces the
    /// existing title, priority and roles when it asks to merge with a
    /// strictly higher priority. Returns whether anything changed.
    pub fn add_tool(&mut self, mut tool: Tool) -> bool {
        if constants::RESERVED_TOOL_IDS.iter().any(|reserved| *reserved == tool.id()) {
            log::debug!("Refusing tool with reserved id '{}'", tool.id());
            return false;
        }
        default_roles(&mut tool.roles);

        match self.tools.iter_mut().find(|existing| existing.id() == tool.id()) {
            Some(existing) => {
                if tool.merge && existing.priority < tool.priority {
                    existing.title = tool.title;
                    existing.priority = tool.priority;
                    existing.roles = tool.roles;
                    true
                } else {
                    log::debug!("Dropping tool '{}': id already registered", tool.id());
                    false
                }
            }
            None => {
                self.tools.push(tool);
                true
            }
        }
    }

    /// Add a topbar item to its tool's bucket. Returns false for a locale
    /// switcher when fewer than two locales are configured.
    pub fn add_topbar_item(&mut self, mut item: TopbarItem) -> bool {
        if item.base.kind == ItemKind::LocaleSwitcher && self.settings.locales.len() < 2 {
            log::debug!("Skipping locale switcher '{}': fewer than two locales", item.id());
            return false;
        }
        default_roles(&mut item.base.roles);
        self.register_route(&item.base, None);

        let tool = item.base.tool().to_string();
        let bucket = self.topbar.entry(tool).or_default().bucket_mut(item.position);
        upsert_sorted(bucket, item, TopbarItem::id);
        true
    }

    /// Add a sidebar item, optionally below `explicit_parent`.
    ///
    /// Returns `Ok(false)` when the item's roles and the viewer's roles do not
    /// intersect; such items are hidden. Items with a parent are queued until
    /// [`apply_pending`](Self::apply_pending) runs.
    pub fn add_sidebar_item(
        &mut self,
        mut item: SidebarItem,
        explicit_parent: &str,
    ) -> std::result::Result<bool, NavigationError> {
        default_roles(&mut item.base.roles);

        if !explicit_parent.is_empty() {
            if let Some(declared) = item.parent_path() {
                if declared != explicit_parent {
                    return Err(NavigationError::ParentConflict {
                        item: item.id().to_string(),
                        declared,
                        explicit: explicit_parent.to_string(),
                    });
                }
            }
            item.set_parent(explicit_parent)?;
        }

        if item.base.roles.is_disjoint(&self.viewer_roles) {
            log::debug!("Hiding sidebar item '{}' from viewer", item.id());
            return Ok(false);
        }

        let parent = item.parent().map(str::to_string);
        self.register_route(&item.base, parent);

        if item.pending().is_some() {
            self.pending.push(item);
        } else {
            let tool = item.base.tool().to_string();
            upsert_sorted(self.sidebar.entry(tool).or_default(), item, SidebarItem::id);
        }
        Ok(true)
    }

    /// Number of sidebar items waiting for their parent
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Attach queued sidebar items to their parents.
    ///
    /// Runs passes until no item can be attached anymore, so chains of queued
    /// items resolve in any order. Fails with
    /// [`NavigationError::ParentNotFound`] for the first item whose ancestor
    /// chain does not exist; unresolved items stay queued.
    pub fn apply_pending(&mut self) -> std::result::Result<(), NavigationError> {
        if self.attach_queued() {
            return Ok(());
        }

        let item = &self.pending[0];
        let parent_path = item.pending().map(|p| p.parent_path.clone()).unwrap_or_default();
        let roots = self.sidebar.get_mut(item.base.tool());
        let missing = match roots {
            Some(roots) => find_path_mut(roots, &parent_path).err(),
            None => parent_path.first().cloned(),
        };
        Err(NavigationError::ParentNotFound(
            missing.unwrap_or_else(|| item.id().to_string()),
        ))
    }

    /// Attach whatever queued items can be attached; `true` once the queue is empty
    fn attach_queued(&mut self) -> bool {
        loop {
            let queued = std::mem::take(&mut self.pending);
            let before = queued.len();

            for mut item in queued {
                let Some(PendingAttach { parent_path }) = item.pending().cloned() else {
                    continue;
                };
                let tool = item.base.tool().to_string();
                let roots = self.sidebar.entry(tool).or_default();
                match find_path_mut(roots, &parent_path) {
                    Ok(parent) => {
                        item.take_pending();
                        parent.add_child(item);
                    }
                    Err(_) => self.pending.push(item),
                }
            }

            if self.pending.is_empty() {
                return true;
            }
            if self.pending.len() == before {
                return false;
            }
        }
    }

    /// Mark the sidebar items along a dash-delimited route as active.
    ///
    /// The first segment must be a registered route of `tool`. It is looked
    /// up among the top-level items, or below its registered parent; every
    /// further segment must be a child of the previous one. Queued items are
    /// attached first; items whose parent is still missing stay queued and do
    /// not affect the route.
    pub fn set_route(&mut self, tool: &str, route: &str) -> std::result::Result<(), NavigationError> {
        self.attach_queued();

        let segments: Vec<&str> = route.split(PATH_SEPARATOR).collect();
        let first = segments[0];
        let entry = self
            .routes
            .get(tool)
            .and_then(|routes| routes.get(first))
            .cloned()
            .ok_or_else(|| NavigationError::UnknownRoute {
                tool: tool.to_string(),
                route: first.to_string(),
            })?;

        let mut topbar_hit = false;
        if let Some(buckets) = self.topbar.get_mut(tool) {
            for item in buckets.start.iter_mut().chain(buckets.end.iter_mut()) {
                if item.id() == first {
                    item.base.active = true;
                    topbar_hit = true;
                }
            }
        }

        let roots = self.sidebar.entry(tool.to_string()).or_default();
        let mut node: &mut SidebarItem = if roots.iter().any(|item| item.id() == first) {
            find_top_mut(roots, first)?
        } else if let Some(parent) = entry.parent.as_deref() {
            let parent_item = find_top_mut(roots, parent)?;
            parent_item.base.active = true;
            parent_item
                .child_mut(first)
                .ok_or_else(|| NavigationError::ParentNotFound(first.to_string()))?
        } else if topbar_hit {
            return Ok(());
        } else {
            return Err(NavigationError::ParentNotFound(first.to_string()));
        };
        node.base.active = true;

        for segment in &segments[1..] {
            node = node
                .child_mut(segment)
                .ok_or_else(|| NavigationError::ParentNotFound(segment.to_string()))?;
            node.base.active = true;
        }
        Ok(())
    }

    /// Route registry of a tool: item id → route
    pub fn routes(&self, tool: &str) -> Option<&BTreeMap<String, RouteEntry>> {
        self.routes.get(tool)
    }

    /// Sidebar tree of a tool, top-level items ordered
    pub fn sidebar(&self, tool: &str) -> &[SidebarItem] {
        self.sidebar.get(tool).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Topbar items of a tool at `position`.
    ///
    /// Fetching the end bucket first synthesizes the configured dark mode
    /// toggle and locale switcher unless an item of that kind or id is present.
    pub fn topbar(&mut self, tool: &str, position: Position) -> &[TopbarItem] {
        if position == Position::End {
            self.inject_default_topbar(tool);
        }
        match self.topbar.get(tool) {
            Some(buckets) => buckets.bucket(position).as_slice(),
            None => &[],
        }
    }

    /// The initialization pass: every active plugin contributes, then queued
    /// sidebar items are attached
    pub fn collect_from(&mut self, registry: &PluginRegistry) -> Result<()> {
        for plugin in registry.active_only() {
            log::debug!("Collecting navigation from plugin '{}'", plugin.name());
            plugin.build_navigation(self)?;
        }
        self.apply_pending()?;
        Ok(())
    }

    /// Snapshot of everything visible to the viewer
    pub fn build(&mut self) -> Navigation {
        let ids: Vec<String> = self.tools.iter().map(|tool| tool.id().to_string()).collect();
        let mut tools = Vec::new();

        for id in ids {
            let Some(tool) = self.tool(&id).cloned() else {
                continue;
            };
            if tool.roles.is_disjoint(&self.viewer_roles) {
                continue;
            }
            let topbar_end = self.visible_topbar(&id, Position::End);
            let topbar_start = self.visible_topbar(&id, Position::Start);
            tools.push(ToolNavigation {
                sidebar: self.sidebar(&id).to_vec(),
                tool,
                topbar_start,
                topbar_end,
            });
        }

        Navigation {
            current_tool: self.current_tool.clone(),
            tools,
        }
    }

    fn visible_topbar(&mut self, tool: &str, position: Position) -> Vec<TopbarItem> {
        let viewer_roles = self.viewer_roles.clone();
        self.topbar(tool, position)
            .iter()
            .filter(|item| !item.base.roles.is_disjoint(&viewer_roles))
            .cloned()
            .collect()
    }

    fn inject_default_topbar(&mut self, tool: &str) {
        let mut defaults = Vec::new();
        // A default is present when an item has its kind or its id
        let present = |kind: ItemKind, id: &str, buckets: Option<&TopbarBuckets>| {
            buckets.is_some_and(|b| {
                b.end
                    .iter()
                    .any(|item| item.base.kind == kind || item.id() == id)
            })
        };
        let buckets = self.topbar.get(tool);

        if self.settings.darkmode_toggle
            && !present(ItemKind::DarkmodeToggle, constants::DARKMODE_TOGGLE_ID, buckets)
        {
            if let Ok(item) = TopbarItem::new(tool, constants::DARKMODE_TOGGLE_ID, "Dark mode") {
                defaults.push(
                    item.with_kind(ItemKind::DarkmodeToggle)
                        .with_order(DARKMODE_TOGGLE_ORDER),
                );
            }
        }
        if self.settings.locale_switcher
            && self.settings.locales.len() >= 2
            && !present(ItemKind::LocaleSwitcher, constants::LOCALE_SWITCHER_ID, buckets)
        {
            if let Ok(item) = TopbarItem::new(tool, constants::LOCALE_SWITCHER_ID, "Language") {
                defaults.push(
                    item.with_kind(ItemKind::LocaleSwitcher)
                        .with_order(LOCALE_SWITCHER_ORDER),
                );
            }
        }
        if defaults.is_empty() {
            return;
        }

        let end = &mut self.topbar.entry(tool.to_string()).or_default().end;
        for mut item in defaults {
            default_roles(&mut item.base.roles);
            item.position = Position::End;
            end.insert(0, item);
        }
        end.sort_by(sort_items);
    }

    fn register_route(&mut self, item: &MenuItem, parent: Option<String>) {
        if let Some(route) = item.route() {
            self.routes.entry(item.tool().to_string()).or_default().insert(
                item.id().to_string(),
                RouteEntry {
                    route: route.to_string(),
                    parent,
                },
            );
        }
    }
}

/// Serializable navigation of one viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub current_tool: Option<String>,
    pub tools: Vec<ToolNavigation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolNavigation {
    pub tool: Tool,
    pub topbar_start: Vec<TopbarItem>,
    pub topbar_end: Vec<TopbarItem>,
    pub sidebar: Vec<SidebarItem>,
}

impl Navigation {
    pub fn tool(&self, id: &str) -> Option<&ToolNavigation> {
        self.tools.iter().find(|nav| nav.tool.id() == id)
    }
}

fn default_roles(roles: &mut BTreeSet<String>) {
    if roles.is_empty() {
        roles.insert(constants::ROLE_USER.to_string());
    }
}

fn find_top_mut<'a>(
    roots: &'a mut [SidebarItem],
    id: &str,
) -> std::result::Result<&'a mut SidebarItem, NavigationError> {
    roots
        .iter_mut()
        .find(|item| item.id() == id)
        .ok_or_else(|| NavigationError::ParentNotFound(id.to_string()))
}

/// Walk `path` from the top level down. On failure returns the first missing id.
fn find_path_mut<'a>(
    roots: &'a mut [SidebarItem],
    path: &[String],
) -> std::result::Result<&'a mut SidebarItem, String> {
    let (first, rest) = path.split_first().ok_or_else(String::new)?;
    let mut node = roots
        .iter_mut()
        .find(|item| item.id() == first)
        .ok_or_else(|| first.clone())?;
    for segment in rest {
        node = node.child_mut(segment).ok_or_else(|| segment.clone())?;
    }
    Ok(node)
}
