mod common;

use common::{dispatcher, is_same, labels, path, recorder};
use waypost::{
    NodeId, Priority,
    testing::{RecordingNode, VisitLog},
};

#[tokio::test]
async fn test_children_are_asked_by_descending_priority() {
    let log = VisitLog::new();
    let root = dispatcher("root");
    recorder(&root, RecordingNode::declining("A"), Priority::LOW, &log);
    recorder(&root, RecordingNode::declining("B"), Priority::HIGH, &log);
    recorder(&root, RecordingNode::declining("C"), Priority::MEDIUM, &log);

    assert_eq!(labels(&root.children()), vec!["B", "C", "A"]);

    let handled = root.dispatch(&path("/nowhere")).await;
    assert!(handled.is_none());
    assert_eq!(log.entries(), vec!["B", "C", "A"]);
}

#[tokio::test]
async fn test_equal_priority_keeps_insertion_order_and_stops_at_first_hit() {
    let log = VisitLog::new();
    let root = dispatcher("root");
    let (first, _) = recorder(&root, RecordingNode::declining("first"), Priority::MEDIUM, &log);
    let (_, second) = recorder(
        &root,
        RecordingNode::accepting_value("second", path("/r")),
        Priority::MEDIUM,
        &log,
    );
    let (third, _) = recorder(
        &root,
        RecordingNode::accepting("third"),
        Priority::MEDIUM,
        &log,
    );

    let handled = root.dispatch(&path("/r")).await;
    assert!(is_same(&handled, NodeId::of(&second)));
    assert_eq!(log.entries(), vec!["first", "second"]);
    assert_eq!(first.visit_count(), 1);
    assert_eq!(third.visit_count(), 0);
}

#[tokio::test]
async fn test_async_leaves_preserve_visit_order() {
    let log = VisitLog::new();
    let root = dispatcher("root");
    recorder(
        &root,
        RecordingNode::declining("slow-high").asynchronous(),
        Priority::HIGH,
        &log,
    );
    recorder(&root, RecordingNode::declining("sync-medium"), Priority::MEDIUM, &log);
    let (_, last) = recorder(
        &root,
        RecordingNode::accepting_type::<u64>("async-low").asynchronous(),
        Priority::LOW,
        &log,
    );

    let handled = root.dispatch(&9_u64).await;
    assert!(is_same(&handled, NodeId::of(&last)));
    assert_eq!(log.entries(), vec!["slow-high", "sync-medium", "async-low"]);
}

#[tokio::test]
async fn test_unhandled_dispatch_is_deterministic() {
    let log = VisitLog::new();
    let root = dispatcher("root");
    let child = dispatcher("child");
    root.attach(child.clone(), Priority::HIGH, Default::default())
        .unwrap();
    recorder(&root, RecordingNode::declining("x"), Priority::new(250), &log);
    recorder(&child, RecordingNode::declining("y"), Priority::LOW, &log);
    recorder(&root, RecordingNode::declining("z"), Priority::new(250), &log);

    assert!(child.dispatch(&path("/a")).await.is_none());
    let first_run = log.entries();
    log.clear();
    assert!(child.dispatch(&path("/a")).await.is_none());

    assert_eq!(first_run, vec!["y", "x", "z"]);
    assert_eq!(log.entries(), first_run);
}

#[tokio::test]
async fn test_try_dispatch_and_blocking_dispatch() {
    let root = dispatcher("root");
    let accepted = root.attach_owned(RecordingNode::accepting_type::<String>("strings"), Priority::MEDIUM);

    let handled = root.try_dispatch(&path("/a")).await.unwrap();
    assert_eq!(NodeId::of(&handled), NodeId::of(&accepted));

    let err = root.try_dispatch(&5_i32).await.unwrap_err();
    assert_eq!(err.to_string(), "no node handled the request of type `i32`");

    let blocking = std::thread::spawn({
        let root = root.clone();
        move || root.dispatch_blocking(&path("/b")).map(|node| NodeId::of(&node))
    })
    .join()
    .unwrap();
    assert_eq!(blocking, Some(NodeId::of(&accepted)));
}
