use super::*;
use shared::domain::ElementId;

#[tokio::test]
async fn broadcast_delivers_once_to_every_subscriber() {
    let notifier = BroadcastNotifier::new(8);
    let mut first = notifier.subscribe().expect("push subscription");
    let mut second = notifier.subscribe().expect("push subscription");
    assert_eq!(notifier.subscriber_count(), 2);

    notifier.publish(ServerEvent::ElementDeleted {
        element_id: ElementId::new("p1"),
    });

    for rx in [&mut first, &mut second] {
        let event = rx.recv().await.expect("event");
        assert_eq!(event.kind(), "element_deleted");
        assert!(rx.try_recv().is_err());
    }
}

#[tokio::test]
async fn dropped_subscriber_is_deregistered() {
    let notifier = BroadcastNotifier::new(8);
    let rx = notifier.subscribe().expect("push subscription");
    drop(rx);
    assert_eq!(notifier.subscriber_count(), 0);

    notifier.publish(ServerEvent::ResponsesCleared);
}

#[tokio::test]
async fn late_subscriber_gets_no_replay() {
    let notifier = BroadcastNotifier::new(8);
    notifier.publish(ServerEvent::ResponsesCleared);

    let mut rx = notifier.subscribe().expect("push subscription");
    assert!(rx.try_recv().is_err());
}

#[test]
fn poll_notifier_has_no_push_channel() {
    let notifier = PollNotifier;
    notifier.publish(ServerEvent::ResponsesCleared);
    assert!(notifier.subscribe().is_none());
    assert_eq!(notifier.subscriber_count(), 0);
}
