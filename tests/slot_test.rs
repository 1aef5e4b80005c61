/*!
 * Signal Slot Tests
 * FIFO ordering, capacity accounting and schema population of a single slot
 */

use mockall::{mock, Sequence};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use state_signals::signals::{DescriptorSink, SignalSlot};
use state_signals::{ParameterDescriptor, ParameterType, SignalDefinition, SignalPhase, SignalUuid};

mock! {
    pub Sink {}

    impl DescriptorSink for Sink {
        fn add_typed_parameter(&mut self, name: &str, parameter_type: ParameterType);
    }
}

fn slot(capacity: u32) -> SignalSlot {
    let definition = SignalDefinition::new(
        "printer1",
        "confirmDoor",
        vec![
            ParameterDescriptor::new("door", ParameterType::Integer),
            ParameterDescriptor::new("operator", ParameterType::String),
        ],
        vec![ParameterDescriptor::new("confirmed", ParameterType::Bool)],
        1000,
        capacity,
    )
    .unwrap();
    SignalSlot::new(definition)
}

fn uuids(count: usize) -> Vec<SignalUuid> {
    (0..count).map(|_| SignalUuid::generate()).collect()
}

#[test]
fn test_populate_descriptors_in_declaration_order() {
    let slot = slot(2);

    let mut params = MockSink::new();
    let mut seq = Sequence::new();
    params
        .expect_add_typed_parameter()
        .withf(|name, ty| name == "door" && *ty == ParameterType::Integer)
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());
    params
        .expect_add_typed_parameter()
        .withf(|name, ty| name == "operator" && *ty == ParameterType::String)
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());
    slot.populate_parameter_descriptors(&mut params);

    let mut results = MockSink::new();
    results
        .expect_add_typed_parameter()
        .withf(|name, ty| name == "confirmed" && *ty == ParameterType::Bool)
        .times(1)
        .return_const(());
    slot.populate_result_descriptors(&mut results);
}

#[test]
fn test_populate_into_plain_vec() {
    let slot = slot(2);
    let mut sink: Vec<(String, ParameterType)> = Vec::new();
    slot.populate_result_descriptors(&mut sink);
    assert_eq!(sink, vec![("confirmed".to_string(), ParameterType::Bool)]);
}

#[test]
fn test_slot_rejects_uuid_it_already_tracks() {
    let slot = slot(4);
    let id = SignalUuid::generate();
    assert!(slot.enqueue(&id, "{}", 100));
    assert!(!slot.enqueue(&id, "{}", 100));
    assert!(slot.advance_to_handled(&id, "{}").unwrap());
    assert!(!slot.enqueue(&id, "{}", 100));
    assert!(slot.erase(&id));
    assert!(slot.enqueue(&id, "{}", 100));
}

#[test]
fn test_erase_from_middle_keeps_order() {
    let slot = slot(4);
    let ids = uuids(3);
    for id in &ids {
        assert!(slot.enqueue(id, "{}", 100));
    }

    assert!(slot.erase(&ids[1]));
    assert!(!slot.contains(&ids[1]));
    assert_eq!(slot.available_capacity(), 2);

    assert_eq!(slot.peek_front(), Some(ids[0].clone()));
    slot.advance_to_in_process(&ids[0]).unwrap();
    assert_eq!(slot.peek_front(), Some(ids[2].clone()));
}

#[test]
fn test_clear_returns_queue_order_and_keeps_messages() {
    let slot = slot(4);
    let ids = uuids(4);
    for id in &ids {
        slot.enqueue(id, "{}", 100);
    }
    slot.advance_to_in_process(&ids[2]).unwrap();

    let cleared = slot.clear();
    assert_eq!(cleared, vec![ids[0].clone(), ids[1].clone(), ids[3].clone()]);
    assert_eq!(slot.available_capacity(), 4);
    assert_eq!(slot.phase_of(&ids[3]).unwrap(), SignalPhase::Cleared);
    assert_eq!(slot.phase_of(&ids[2]).unwrap(), SignalPhase::InProcess);

    let snapshot = slot.snapshot();
    assert_eq!(snapshot.cleared, 3);
    assert_eq!(snapshot.tracked, 4);
    assert!(slot.clear().is_empty());
}

proptest! {
    #[test]
    fn prop_peek_follows_enqueue_order(count in 1usize..32) {
        let slot = slot(32);
        let ids = uuids(count);
        for id in &ids {
            let accepted = slot.enqueue(id, "{}", 100);
            prop_assert!(accepted);
            prop_assert_eq!(slot.peek_front(), Some(ids[0].clone()));
        }

        for (i, id) in ids.iter().enumerate() {
            prop_assert_eq!(slot.peek_front(), Some(id.clone()));
            if i % 2 == 0 {
                prop_assert!(slot.advance_to_in_process(id).unwrap());
            } else {
                let failed = slot.advance_to_failed(id, "{}", "skip").unwrap();
                prop_assert!(failed);
            }
        }
        prop_assert_eq!(slot.peek_front(), None);
    }

    #[test]
    fn prop_capacity_is_never_exceeded(capacity in 1u32..24, attempts in 0usize..48) {
        let slot = slot(capacity);
        let accepted = uuids(attempts)
            .iter()
            .filter(|id| slot.enqueue(id, "{}", 100))
            .count();

        prop_assert_eq!(accepted, attempts.min(capacity as usize));
        prop_assert_eq!(slot.available_capacity() as usize, capacity as usize - accepted);
        prop_assert_eq!(slot.is_full(), accepted == capacity as usize);
        prop_assert_eq!(slot.total_capacity(), capacity);
    }

    #[test]
    fn prop_illegal_transitions_leave_phase(step in 0u8..3) {
        let slot = slot(2);
        let id = SignalUuid::generate();
        slot.enqueue(&id, "{}", 100);
        slot.advance_to_handled(&id, r#"{"ok":true}"#).unwrap();

        let moved = match step {
            0 => slot.advance_to_in_process(&id).unwrap(),
            1 => slot.advance_to_handled(&id, "{}").unwrap(),
            _ => slot.advance_to_failed(&id, "{}", "late").unwrap(),
        };
        prop_assert!(!moved);
        prop_assert_eq!(slot.phase_of(&id).unwrap(), SignalPhase::Handled);
        prop_assert_eq!(slot.result_json_of(&id).unwrap(), r#"{"ok":true}"#.to_string());
    }
}
