mod common;

use common::{dispatcher, path};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use waypost::{
    NodeId, Priority,
    adapters::{Completion, DispatcherExt},
};

#[tokio::test]
async fn test_closures_decline_other_types_without_being_called() {
    let calls = Arc::new(AtomicUsize::new(0));
    let root = dispatcher("root");

    let counter = calls.clone();
    root.add_handler(Priority::HIGH, move |n: &u32| {
        counter.fetch_add(1, Ordering::SeqCst);
        *n == 1
    });
    let counter = calls.clone();
    root.add_async_handler(Priority::MEDIUM, move |n: u32| {
        counter.fetch_add(1, Ordering::SeqCst);
        async move { n == 2 }
    });
    let counter = calls.clone();
    root.add_callback_handler(Priority::LOW, move |n: u32, done: Completion| {
        counter.fetch_add(1, Ordering::SeqCst);
        done.complete(n == 3);
    });

    assert!(root.dispatch(&path("/a")).await.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    assert!(root.dispatch(&4_u32).await.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_deferred_callback_completes_from_another_task() {
    let root = dispatcher("root");
    let handler = root.add_callback_handler(Priority::MEDIUM, |n: u32, done: Completion| {
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            done.complete(n % 2 == 0);
        });
    });

    let handled = root.dispatch(&8_u32).await;
    assert_eq!(handled.map(|node| NodeId::of(&node)), Some(NodeId::of(&handler)));
    assert!(root.dispatch(&7_u32).await.is_none());
}
