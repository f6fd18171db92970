//! Tests for tokio spawner and poll trigger

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use signaling_queue::runtime::tokio_spawner::TokioSpawner;
use signaling_queue::runtime::PollTrigger;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_spawn() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send(123).unwrap();
    });

    let result = rx.await.expect("oneshot result");
    assert_eq!(result, 123);
}

#[tokio::test]
async fn test_tokio_spawner_current() {
    let spawner = TokioSpawner::current().expect("inside a runtime");
    let handle = spawner.spawn(async {});
    handle.await.expect("spawned task");
}

#[test]
fn test_tokio_spawner_current_outside_runtime() {
    assert!(TokioSpawner::current().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_trigger_dropped_never_fires() {
    let fired = Arc::new(AtomicUsize::new(0));
    let trigger = PollTrigger::new(TokioSpawner::current().unwrap());
    let count = Arc::clone(&fired);
    trigger.arm(Duration::from_millis(10), move || {
        count.fetch_add(1, Ordering::SeqCst);
    });
    drop(trigger);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_trigger_can_rearm_from_callback() {
    let fired = Arc::new(AtomicUsize::new(0));
    let trigger = Arc::new(PollTrigger::new(TokioSpawner::current().unwrap()));

    let count = Arc::clone(&fired);
    let again = Arc::downgrade(&trigger);
    trigger.arm(Duration::from_millis(5), move || {
        count.fetch_add(1, Ordering::SeqCst);
        if let Some(trigger) = again.upgrade() {
            let count = Arc::clone(&count);
            trigger.arm(Duration::from_millis(5), move || {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 2);
    assert!(!trigger.is_armed());
}
