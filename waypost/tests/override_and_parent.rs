mod common;

use common::{dispatcher, is_same, path, recorder};
use std::sync::Arc;
use waypost::{
    Dispatcher, NodeId, NodeRef, Priority, SkipSet, StorageOption,
    testing::{RecordingNode, VisitLog},
};

#[tokio::test]
async fn test_accepting_override_shadows_children_and_parent() {
    let log = VisitLog::new();
    let parent_handler = RecordingNode::accepting("P-handler").with_log(&log);
    let parent = Dispatcher::builder()
        .name("P")
        .handler(parent_handler.clone())
        .build();
    let d = dispatcher("D");
    parent.attach(d.clone(), Priority::MEDIUM, StorageOption::Strong).unwrap();

    let (b, _) = recorder(&d, RecordingNode::accepting("B"), Priority::HIGH, &log);
    let (c, _) = recorder(&d, RecordingNode::accepting("C"), Priority::MEDIUM, &log);
    let o: NodeRef = Arc::new(RecordingNode::accepting("O").with_log(&log));
    d.set_override(o.clone(), StorageOption::Strong).unwrap();

    let handled = d.dispatch(&path("/x")).await;
    assert!(is_same(&handled, NodeId::of(&o)));
    assert_eq!(log.entries(), vec!["O"]);
    assert_eq!(b.visit_count(), 0);
    assert_eq!(c.visit_count(), 0);
    assert_eq!(parent_handler.visit_count(), 0);
}

#[tokio::test]
async fn test_declining_override_is_asked_first_with_the_dispatcher_skipped() {
    let log = VisitLog::new();
    let d = dispatcher("D");
    let (b, b_node) = recorder(&d, RecordingNode::accepting("B"), Priority::HIGH, &log);
    let o = RecordingNode::declining("O").with_log(&log);
    d.set_override(Arc::new(o.clone()), StorageOption::Strong).unwrap();

    let handled = d.dispatch(&path("/x")).await;
    assert!(is_same(&handled, NodeId::of(&b_node)));
    assert_eq!(log.entries(), vec!["O", "B"]);

    let expected: SkipSet = [d.id()].into_iter().collect();
    assert_eq!(o.last_skip(), Some(expected.clone()));
    assert_eq!(b.last_skip(), Some(expected));
}

#[tokio::test]
async fn test_composite_override_does_not_loop_back() {
    let log = VisitLog::new();
    let d = dispatcher("D");
    let overlay = dispatcher("overlay");
    recorder(&overlay, RecordingNode::declining("overlay-leaf"), Priority::MEDIUM, &log);
    recorder(&d, RecordingNode::declining("D-leaf"), Priority::MEDIUM, &log);
    d.set_override(overlay.clone(), StorageOption::Strong).unwrap();
    assert_eq!(overlay.parent().map(|p| p.id()), Some(d.id()));

    assert!(d.dispatch(&path("/x")).await.is_none());
    assert_eq!(log.entries(), vec!["overlay-leaf", "D-leaf"]);

    d.clear_override();
    assert!(d.override_node().is_none());
    assert!(overlay.parent().is_none());
}

#[tokio::test]
async fn test_parent_handles_with_exactly_the_child_skipped() {
    let parent_handler = RecordingNode::accepting_value("P-handler", path("r"));
    let p = Dispatcher::builder()
        .name("P")
        .handler(parent_handler.clone())
        .build();
    let d = dispatcher("D");
    p.attach(d.clone(), Priority::MEDIUM, StorageOption::Strong).unwrap();

    let handled = d.dispatch(&path("r")).await;
    assert!(is_same(&handled, p.id()));

    let expected: SkipSet = [d.id()].into_iter().collect();
    assert_eq!(parent_handler.last_skip(), Some(expected));
}

#[tokio::test]
async fn test_parent_does_not_redescend_into_the_child() {
    let log = VisitLog::new();
    let p = dispatcher("P");
    let d = dispatcher("D");
    p.attach(d.clone(), Priority::HIGH, StorageOption::Strong).unwrap();
    let (own, _) = recorder(&d, RecordingNode::declining("D-leaf"), Priority::MEDIUM, &log);
    let (_, sibling) = recorder(
        &p,
        RecordingNode::accepting_value("sibling", path("r")),
        Priority::LOW,
        &log,
    );

    let handled = d.dispatch(&path("r")).await;
    assert!(is_same(&handled, NodeId::of(&sibling)));
    assert_eq!(log.entries(), vec!["D-leaf", "sibling"]);
    assert_eq!(own.visit_count(), 1);
}

#[tokio::test]
async fn test_bubbling_reaches_the_root_and_fans_out() {
    // A has children B (high) and C; B has D, E, F; C has G.
    let log = VisitLog::new();
    let a = dispatcher("A");
    let b = dispatcher("B");
    let c = dispatcher("C");
    a.attach(b.clone(), Priority::HIGH, StorageOption::Strong).unwrap();
    a.attach(c.clone(), Priority::MEDIUM, StorageOption::Strong).unwrap();
    let d = dispatcher("D");
    b.attach(d.clone(), Priority::HIGH, StorageOption::Strong).unwrap();
    recorder(&b, RecordingNode::declining("E"), Priority::MEDIUM, &log);
    recorder(&b, RecordingNode::declining("F"), Priority::LOW, &log);
    let (_, g) = recorder(
        &c,
        RecordingNode::accepting_type::<String>("G"),
        Priority::MEDIUM,
        &log,
    );

    let handled = d.dispatch(&path("/deep")).await;
    assert!(is_same(&handled, NodeId::of(&g)));
    assert_eq!(log.entries(), vec!["E", "F", "G"]);
}

#[tokio::test]
async fn test_intrinsic_handler_reports_the_dispatcher() {
    let screen = Dispatcher::builder()
        .name("screen")
        .handler(RecordingNode::accepting_type::<u8>("screen-handler"))
        .build();
    let handled = screen.dispatch(&1_u8).await;
    assert!(is_same(&handled, screen.id()));
    assert!(screen.dispatch(&1_u16).await.is_none());
}
