#![cfg(feature = "macros")]

mod common;

use common::{dispatcher, path};
use waypost::{NodeId, Priority, handler};

#[handler(priority = 1000)]
fn settings(path: &String) -> bool {
    path.starts_with("/settings")
}

#[handler(name = "InboxHandler")]
async fn inbox(path: &String) -> bool {
    tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    path == "/inbox"
}

#[handler(priority = -5)]
fn even(n: &u64) -> bool {
    n % 2 == 0
}

#[tokio::test]
async fn test_generated_nodes_route_requests() {
    let root = dispatcher("root");
    let settings_node = root.attach_owned(settings, settings::PRIORITY);
    let inbox_node = root.attach_owned(InboxHandler, Priority::LOW);
    root.attach_owned(even, even::PRIORITY);

    assert_eq!(settings::PRIORITY, Priority::HIGH);
    assert_eq!(even::PRIORITY, Priority::new(-5));
    assert_eq!(settings_node.label(), "settings");
    assert_eq!(inbox_node.label(), "inbox");

    let handled = root.dispatch(&path("/settings/profile")).await;
    assert_eq!(handled.map(|n| NodeId::of(&n)), Some(NodeId::of(&settings_node)));

    let handled = root.dispatch(&path("/inbox")).await;
    assert_eq!(handled.map(|n| NodeId::of(&n)), Some(NodeId::of(&inbox_node)));

    assert_eq!(root.dispatch(&4_u64).await.map(|n| n.label().to_string()), Some("even".into()));
    assert!(root.dispatch(&3_u64).await.is_none());
    assert!(root.dispatch(&path("/elsewhere")).await.is_none());
}
