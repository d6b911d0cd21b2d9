use crate::navigation::error::NavigationError;
use crate::navigation::item::{ItemKind, MenuItem, Position, SidebarItem, TopbarItem};

#[test]
fn test_menu_item_defaults() {
    let item = MenuItem::new("main", "home", "Home").unwrap();
    assert_eq!(item.tool(), "main");
    assert_eq!(item.id(), "home");
    assert_eq!(item.kind, ItemKind::Link);
    assert_eq!(item.order, 0);
    assert!(!item.active);
    assert!(item.roles.is_empty());
    assert_eq!(item.route(), None);
}

#[test]
fn test_empty_route_counts_as_none() {
    let item = SidebarItem::new("main", "home", "Home").unwrap().with_route("");
    assert_eq!(item.base.route(), None);

    let item = SidebarItem::new("main", "home", "Home").unwrap().with_route("app_home");
    assert_eq!(item.base.route(), Some("app_home"));
}

#[test]
fn test_set_parent_records_path() {
    let mut item = SidebarItem::new("main", "c", "C").unwrap();
    item.set_parent("a-b").unwrap();

    assert_eq!(item.parent(), Some("b"));
    assert_eq!(item.parent_path().as_deref(), Some("a-b"));
    assert_eq!(
        item.pending().map(|p| p.parent_path.clone()),
        Some(vec!["a".to_string(), "b".to_string()])
    );

    item.set_parent("").unwrap();
    assert_eq!(item.parent(), None);
    assert!(item.pending().is_none());
}

#[test]
fn test_set_parent_rejects_invalid_segment() {
    let result = SidebarItem::new("main", "c", "C").unwrap().with_parent("a--b");
    assert_eq!(result.err(), Some(NavigationError::InvalidIdentifier(String::new())));
}

#[test]
fn test_add_child_replaces_and_orders() {
    let mut parent = SidebarItem::new("main", "reports", "Reports").unwrap();
    parent.add_child(SidebarItem::new("main", "late", "Late").unwrap().with_order(20));
    parent.add_child(SidebarItem::new("main", "early", "Early").unwrap().with_order(10));
    parent.add_child(SidebarItem::new("main", "late", "Later").unwrap().with_order(5));

    let ids: Vec<&str> = parent.children().iter().map(SidebarItem::id).collect();
    assert_eq!(ids, vec!["late", "early"]);
    assert_eq!(parent.child("late").map(|c| c.base.label.as_str()), Some("Later"));
}

#[test]
fn test_topbar_item_serializes_flat() {
    let item = TopbarItem::new("main", "search", "Search")
        .unwrap()
        .with_position(Position::End)
        .with_content("<input>");
    let json = serde_json::to_value(&item).unwrap();

    assert_eq!(json["id"], "search");
    assert_eq!(json["position"], "end");
    assert_eq!(json["kind"], "link");
    assert_eq!(json["content"], "<input>");
    assert!(json.get("content_filter").is_none());
}
