//! Event bus semantics

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use strata_core::{ChangeEvent, EventBus};

#[test]
fn test_subscribers_receive_events_in_order() {
    let bus: EventBus<ChangeEvent> = EventBus::new();
    let (tx, rx) = std::sync::mpsc::channel();

    let _sub = bus.subscribe(move |event: &ChangeEvent| {
        let _ = tx.send(event.clone());
    });

    bus.emit(&ChangeEvent::FileChanged("a.py".into()));
    bus.emit(&ChangeEvent::FileDeleted("b.py".into()));

    assert_eq!(rx.recv().unwrap(), ChangeEvent::FileChanged("a.py".into()));
    assert_eq!(rx.recv().unwrap(), ChangeEvent::FileDeleted("b.py".into()));
}

#[test]
fn test_unsubscribe_removes_entry() {
    let bus: EventBus<ChangeEvent> = EventBus::new();
    let count = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&count);
    let sub = bus.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(bus.subscriber_count(), 1);

    bus.emit(&ChangeEvent::Merge);
    bus.unsubscribe(sub);
    assert_eq!(bus.subscriber_count(), 0);
    bus.emit(&ChangeEvent::Merge);

    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_multiple_subscribers_all_notified() {
    let bus: EventBus<ChangeEvent> = EventBus::new();
    let count = Arc::new(AtomicUsize::new(0));

    let a = Arc::clone(&count);
    let _sub_a = bus.subscribe(move |_| {
        a.fetch_add(1, Ordering::SeqCst);
    });
    let b = Arc::clone(&count);
    let _sub_b = bus.subscribe(move |_| {
        b.fetch_add(1, Ordering::SeqCst);
    });

    bus.emit(&ChangeEvent::Rebase);
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn test_clone_shares_subscriber_list() {
    let bus: EventBus<ChangeEvent> = EventBus::new();
    let clone = bus.clone();
    let count = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&count);
    let _sub = bus.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    clone.emit(&ChangeEvent::CherryPick);
    assert_eq!(count.load(Ordering::SeqCst), 1);
}
