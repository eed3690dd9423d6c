//! Property-based tests for the local conversation view
//!
//! Uses proptest to generate arbitrary delivery schedules and verify the
//! ordering invariants hold for every one of them.

use chrono::Utc;
use proptest::prelude::*;
use uuid::Uuid;

use servilink::client::ConversationView;
use servilink::shared::messaging::Message;

fn message(conversation_id: Uuid, sequence: i64) -> Message {
    Message {
        id: Uuid::new_v4(),
        conversation_id,
        sender_id: Uuid::new_v4(),
        content: format!("msg {}", sequence),
        sequence,
        created_at: Utc::now(),
    }
}

/// A shuffled delivery schedule of the sequences 1..=n.
fn arrival_schedules() -> impl Strategy<Value = Vec<i64>> {
    (1usize..20).prop_flat_map(|n| {
        Just((1..=n as i64).collect::<Vec<i64>>()).prop_shuffle()
    })
}

proptest! {
    /// Whatever order deltas arrive in, the view reads back in sequence
    /// order with the cursor at the maximum.
    #[test]
    fn view_orders_any_arrival_permutation(schedule in arrival_schedules()) {
        let conversation_id = Uuid::new_v4();
        let mut view = ConversationView::new(conversation_id);
        let expected: Vec<i64> = (1..=schedule.len() as i64).collect();

        for sequence in &schedule {
            view.apply_delta(vec![message(conversation_id, *sequence)]);
        }

        let observed: Vec<i64> = view.messages().iter().map(|m| m.sequence).collect();
        prop_assert_eq!(observed, expected);
        prop_assert_eq!(view.last_seen_sequence(), schedule.len() as i64);
    }

    /// Replaying every delta a second time changes nothing.
    #[test]
    fn redelivery_is_idempotent(schedule in arrival_schedules()) {
        let conversation_id = Uuid::new_v4();
        let mut view = ConversationView::new(conversation_id);

        let messages: Vec<Message> = schedule
            .iter()
            .map(|sequence| message(conversation_id, *sequence))
            .collect();

        view.apply_delta(messages.clone());
        view.apply_delta(messages);

        prop_assert_eq!(view.messages().len(), schedule.len());
    }
}
