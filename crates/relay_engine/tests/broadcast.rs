use std::time::Duration;

use futures_util::StreamExt;
use relay_core::ProgressEvent;
use relay_engine::{ProgressBroadcaster, ProgressSink};

#[tokio::test]
async fn every_observer_sees_events_in_order() {
    let broadcaster = ProgressBroadcaster::default();
    let mut first = broadcaster.subscribe();
    let mut second = broadcaster.subscribe();

    assert_eq!(broadcaster.publish(ProgressEvent::info("one")), 2);
    broadcaster.emit(ProgressEvent::success("two"));

    for subscription in [&mut first, &mut second] {
        assert_eq!(subscription.recv().await, Some(ProgressEvent::info("one")));
        assert_eq!(subscription.recv().await, Some(ProgressEvent::success("two")));
        assert_eq!(subscription.try_recv(), None);
    }
}

#[tokio::test]
async fn late_observers_get_no_replay() {
    let broadcaster = ProgressBroadcaster::default();
    assert_eq!(broadcaster.publish(ProgressEvent::info("before")), 0);

    let mut late = broadcaster.subscribe();
    broadcaster.publish(ProgressEvent::info("after"));

    assert_eq!(late.recv().await, Some(ProgressEvent::info("after")));
    assert_eq!(late.try_recv(), None);
}

#[tokio::test]
async fn slow_observer_never_blocks_publishing() {
    let broadcaster = ProgressBroadcaster::new(4);
    let mut slow = broadcaster.subscribe();
    let mut fast = broadcaster.subscribe();

    for i in 0..10 {
        broadcaster.publish(ProgressEvent::info(format!("event {i}")));
        assert_eq!(
            fast.recv().await,
            Some(ProgressEvent::info(format!("event {i}")))
        );
    }

    // The slow observer lost the oldest events but resumes with the newest.
    assert_eq!(slow.recv().await, Some(ProgressEvent::info("event 6")));
}

#[tokio::test]
async fn dropping_a_subscription_unsubscribes() {
    let broadcaster = ProgressBroadcaster::default();
    let first = broadcaster.subscribe();
    let _second = broadcaster.subscribe();
    assert_eq!(broadcaster.observer_count(), 2);

    first.unsubscribe();
    assert_eq!(broadcaster.observer_count(), 1);
    assert_eq!(broadcaster.publish(ProgressEvent::warn("x")), 1);
}

#[tokio::test]
async fn stream_ends_when_broadcaster_is_dropped() {
    let broadcaster = ProgressBroadcaster::default();
    let stream = broadcaster.subscribe().into_stream();

    broadcaster.publish(ProgressEvent::info("a"));
    broadcaster.publish(ProgressEvent::error("b"));
    drop(broadcaster);

    let collected: Vec<_> = tokio::time::timeout(Duration::from_secs(1), stream.collect())
        .await
        .expect("stream closes");
    assert_eq!(
        collected,
        vec![ProgressEvent::info("a"), ProgressEvent::error("b")]
    );
}
