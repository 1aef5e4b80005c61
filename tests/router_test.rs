/*!
 * Signal Router Tests
 * Registration, UUID routing, phase transitions and queue back-pressure
 */

use pretty_assertions::assert_eq;
use rand::Rng;
use state_signals::signals::{SignalOwner, SignalStats};
use state_signals::{SignalError, SignalPhase, SignalRouter, SignalUuid};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

const INSTANCE: &str = "printer1";
const SIGNAL: &str = "confirmDoor";

fn printer_router(capacity: u32) -> SignalRouter {
    let router = SignalRouter::new();
    router
        .register_definition(INSTANCE, SIGNAL, vec![], vec![], 1000, capacity)
        .unwrap();
    router
}

fn uuid() -> String {
    SignalUuid::generate().to_string()
}

#[test]
fn test_register_then_duplicate() {
    let router = SignalRouter::new();
    assert!(!router.has_definition(INSTANCE, SIGNAL));

    router
        .register_definition(INSTANCE, SIGNAL, vec![], vec![], 1000, 2)
        .unwrap();
    assert!(router.has_definition(INSTANCE, SIGNAL));

    let err = router
        .register_definition(INSTANCE, SIGNAL, vec![], vec![], 500, 4)
        .unwrap_err();
    assert_eq!(
        err,
        SignalError::DuplicateDefinition {
            instance: INSTANCE.to_string(),
            signal: SIGNAL.to_string(),
        }
    );

    // First registration wins
    assert_eq!(router.default_reaction_timeout(INSTANCE, SIGNAL).unwrap(), 1000);
    assert_eq!(router.total_queue_slots(INSTANCE, SIGNAL).unwrap(), 2);
    assert_eq!(router.stats().definitions_registered, 1);
}

#[test]
fn test_registration_bounds() {
    let router = SignalRouter::new();
    assert!(matches!(
        router.register_definition("", SIGNAL, vec![], vec![], 1000, 2),
        Err(SignalError::InvalidName(_))
    ));
    assert!(matches!(
        router.register_definition(INSTANCE, "", vec![], vec![], 1000, 2),
        Err(SignalError::InvalidName(_))
    ));
    assert_eq!(
        router.register_definition(INSTANCE, SIGNAL, vec![], vec![], 0, 2),
        Err(SignalError::InvalidTimeout(0))
    );
    assert_eq!(
        router.register_definition(INSTANCE, SIGNAL, vec![], vec![], 1000, 0),
        Err(SignalError::InvalidQueueCapacity(0))
    );
    assert!(!router.has_definition(INSTANCE, SIGNAL));
}

#[test]
fn test_unregistered_pair_reports_not_found() {
    let router = printer_router(2);
    let err = router.can_trigger(INSTANCE, "openDoor").unwrap_err();
    assert!(err.is_not_found());
    assert!(router.peek_signal("printer2", SIGNAL).is_err());
    assert!(router.available_queue_slots("printer2", SIGNAL).is_err());
    assert_eq!(router.clear_signals_for_type(INSTANCE, "openDoor"), 0);
    assert_eq!(router.clear_signals_for("printer2"), 0);
}

#[test]
fn test_printer_door_scenario() {
    let router = printer_router(2);
    let (a, b, c) = (uuid(), uuid(), uuid());

    assert!(router.try_enqueue(INSTANCE, SIGNAL, &a, "{}", 1000).unwrap());
    assert_eq!(router.phase_of(&a).unwrap(), SignalPhase::InQueue);
    assert_eq!(router.available_queue_slots(INSTANCE, SIGNAL).unwrap(), 1);

    assert!(router.try_enqueue(INSTANCE, SIGNAL, &b, "{}", 1000).unwrap());
    assert_eq!(router.available_queue_slots(INSTANCE, SIGNAL).unwrap(), 0);

    assert!(!router.try_enqueue(INSTANCE, SIGNAL, &c, "{}", 1000).unwrap());
    assert_eq!(router.available_queue_slots(INSTANCE, SIGNAL).unwrap(), 0);
    assert!(!router.can_trigger(INSTANCE, SIGNAL).unwrap());

    assert!(router.advance_to_handled(&a, "{}").unwrap());
    assert_eq!(router.phase_of(&a).unwrap(), SignalPhase::Handled);
    assert_eq!(router.available_queue_slots(INSTANCE, SIGNAL).unwrap(), 1);
    assert!(router.can_trigger(INSTANCE, SIGNAL).unwrap());

    assert!(router.try_enqueue(INSTANCE, SIGNAL, &c, "{}", 1000).unwrap());
    assert_eq!(router.available_queue_slots(INSTANCE, SIGNAL).unwrap(), 0);
}

#[test]
fn test_duplicate_uuid_across_slots() {
    let router = printer_router(4);
    router
        .register_definition("laser", "startExposure", vec![], vec![], 1000, 4)
        .unwrap();

    let a = uuid();
    assert!(router.try_enqueue(INSTANCE, SIGNAL, &a, "{}", 100).unwrap());

    assert_eq!(
        router.try_enqueue("laser", "startExposure", &a, "{}", 100),
        Err(SignalError::DuplicateUuid(a.clone()))
    );
    assert_eq!(
        router.try_enqueue(INSTANCE, SIGNAL, &a, "{}", 100),
        Err(SignalError::DuplicateUuid(a.clone()))
    );
    assert_eq!(router.available_queue_slots("laser", "startExposure").unwrap(), 4);

    // A terminal signal is still live until finalized
    router.advance_to_handled(&a, "{}").unwrap();
    assert!(router.try_enqueue("laser", "startExposure", &a, "{}", 100).is_err());

    assert!(router.finalize(&a));
    assert!(router.try_enqueue("laser", "startExposure", &a, "{}", 100).unwrap());
}

#[test]
fn test_phase_transition_legality() {
    let router = printer_router(4);
    let a = uuid();
    router.try_enqueue(INSTANCE, SIGNAL, &a, "{}", 100).unwrap();

    assert!(router.advance_to_in_process(&a).unwrap());
    assert_eq!(router.phase_of(&a).unwrap(), SignalPhase::InProcess);
    assert!(!router.advance_to_in_process(&a).unwrap());

    assert!(router.advance_to_failed(&a, r#"{"code":7}"#, "door jammed").unwrap());
    assert_eq!(router.phase_of(&a).unwrap(), SignalPhase::Failed);
    assert_eq!(router.error_message_of(&a).unwrap(), "door jammed");

    // Terminal phases do not move
    assert!(!router.advance_to_in_process(&a).unwrap());
    assert!(!router.advance_to_handled(&a, "{}").unwrap());
    assert!(!router.advance_to_failed(&a, "{}", "again").unwrap());
    assert_eq!(router.phase_of(&a).unwrap(), SignalPhase::Failed);
    assert_eq!(router.result_json_of(&a).unwrap(), r#"{"code":7}"#);

    // Handled straight from the queue
    let b = uuid();
    router.try_enqueue(INSTANCE, SIGNAL, &b, "{}", 100).unwrap();
    assert!(router.advance_to_handled(&b, "{}").unwrap());
    assert!(!router.advance_to_in_process(&b).unwrap());
    assert_eq!(router.phase_of(&b).unwrap(), SignalPhase::Handled);

    let stats = router.stats();
    assert_eq!(stats.total_failed, 1);
    assert_eq!(stats.total_handled, 1);
}

#[test]
fn test_unknown_uuid_queries() {
    let router = printer_router(2);
    let ghost = uuid();
    assert!(matches!(router.phase_of(&ghost), Err(SignalError::SignalNotFound(_))));
    assert!(matches!(
        router.advance_to_handled(&ghost, "{}"),
        Err(SignalError::SignalNotFound(_))
    ));
    assert!(matches!(
        router.result_json_of("not-a-uuid"),
        Err(SignalError::InvalidUuid(_))
    ));
    assert!(router.find_owner(&ghost).is_none());
}

#[test]
fn test_result_payload_round_trip() {
    let router = printer_router(2);
    let a = uuid();
    let payload = "{\"note\":\"caf\u{e9} \\\"quoted\\\"\",  \"n\" : 1 }";

    router.try_enqueue(INSTANCE, SIGNAL, &a, r#"{"door":1}"#, 250).unwrap();
    router.advance_to_in_process(&a).unwrap();
    router.advance_to_handled(&a, payload).unwrap();

    assert_eq!(router.result_json_of(&a).unwrap(), payload);
    assert_eq!(router.parameter_json_of(&a).unwrap(), r#"{"door":1}"#);
    assert_eq!(router.reaction_timeout_of(&a).unwrap(), 250);
    assert_eq!(
        router.find_owner(&a),
        Some(SignalOwner {
            instance: INSTANCE.to_string(),
            signal: SIGNAL.to_string(),
            parameter_json: r#"{"door":1}"#.to_string(),
        })
    );
}

#[test]
fn test_clear_law() {
    let router = printer_router(4);
    router
        .register_definition(INSTANCE, "openDoor", vec![], vec![], 1000, 4)
        .unwrap();

    let (a, b, c, d) = (uuid(), uuid(), uuid(), uuid());
    for id in [&a, &b, &c] {
        router.try_enqueue(INSTANCE, SIGNAL, id, "{}", 100).unwrap();
    }
    router.try_enqueue(INSTANCE, "openDoor", &d, "{}", 100).unwrap();
    router.advance_to_in_process(&a).unwrap();

    assert_eq!(router.clear_signals_for_type(INSTANCE, SIGNAL), 2);
    assert_eq!(router.phase_of(&b).unwrap(), SignalPhase::Cleared);
    assert_eq!(router.phase_of(&c).unwrap(), SignalPhase::Cleared);
    assert_eq!(router.phase_of(&a).unwrap(), SignalPhase::InProcess);
    assert_eq!(router.phase_of(&d).unwrap(), SignalPhase::InQueue);
    assert_eq!(router.available_queue_slots(INSTANCE, SIGNAL).unwrap(), 4);
    assert_eq!(router.peek_signal(INSTANCE, SIGNAL).unwrap(), None);

    // Cleared signals cannot be revived
    assert!(!router.advance_to_in_process(&b).unwrap());
    assert!(!router.advance_to_handled(&b, "{}").unwrap());

    assert_eq!(router.clear_signals_for(INSTANCE), 1);
    assert_eq!(router.phase_of(&d).unwrap(), SignalPhase::Cleared);

    for id in [&b, &c, &d] {
        assert!(router.finalize(id));
        assert!(router.phase_of(id).is_err());
    }
    assert_eq!(router.live_signal_count(), 1);
    assert_eq!(router.stats().total_cleared, 3);
}

#[test]
fn test_finalize_restores_capacity() {
    let router = printer_router(1);
    let a = uuid();
    router.try_enqueue(INSTANCE, SIGNAL, &a, "{}", 100).unwrap();
    assert!(!router.can_trigger(INSTANCE, SIGNAL).unwrap());

    assert!(router.finalize(&a));
    assert!(!router.finalize(&a));
    assert!(router.can_trigger(INSTANCE, SIGNAL).unwrap());
    assert_eq!(router.live_signal_count(), 0);
}

#[test]
fn test_snapshots_and_stats() {
    let router = printer_router(3);
    router
        .register_definition("laser", "startExposure", vec![], vec![], 1000, 2)
        .unwrap();

    let (a, b) = (uuid(), uuid());
    router.try_enqueue(INSTANCE, SIGNAL, &a, "{}", 100).unwrap();
    router.try_enqueue(INSTANCE, SIGNAL, &b, "{}", 100).unwrap();
    router.advance_to_in_process(&a).unwrap();

    let snapshot = router.slot_snapshot(INSTANCE, SIGNAL).unwrap();
    assert_eq!(snapshot.capacity, 3);
    assert_eq!(snapshot.queued, 1);
    assert_eq!(snapshot.in_process, 1);
    assert_eq!(snapshot.tracked, 2);

    let all = router.snapshots();
    let names: Vec<(&str, &str)> = all
        .iter()
        .map(|s| (s.instance.as_str(), s.signal.as_str()))
        .collect();
    assert_eq!(names, vec![("laser", "startExposure"), (INSTANCE, SIGNAL)]);

    assert_eq!(
        router.stats(),
        SignalStats {
            definitions_registered: 2,
            total_enqueued: 2,
            live_signals: 2,
            ..Default::default()
        }
    );
}

#[test]
fn test_concurrent_enqueue_respects_capacity() {
    let router = printer_router(10);
    let threads = 50;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let router = router.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let id = uuid();
                barrier.wait();
                let accepted = router.try_enqueue(INSTANCE, SIGNAL, &id, "{}", 1000).unwrap();
                (id, accepted)
            })
        })
        .collect();

    let outcomes: Vec<(String, bool)> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let accepted: Vec<&String> = outcomes.iter().filter(|(_, ok)| *ok).map(|(id, _)| id).collect();

    assert_eq!(accepted.len(), 10);
    assert_eq!(outcomes.len() - accepted.len(), 40);
    for id in &accepted {
        assert_eq!(router.phase_of(id).unwrap(), SignalPhase::InQueue);
    }
    for (id, _) in outcomes.iter().filter(|(_, ok)| !*ok) {
        assert!(router.phase_of(id).is_err());
    }
    assert_eq!(router.live_signal_count(), 10);
    assert_eq!(router.stats().total_rejected, 40);
}

#[test]
fn test_concurrent_duplicate_uuid_single_winner() {
    let router = printer_router(8);
    for i in 0..7 {
        router
            .register_definition(INSTANCE, &format!("signal{}", i), vec![], vec![], 1000, 8)
            .unwrap();
    }

    let shared = uuid();
    let barrier = Arc::new(Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let router = router.clone();
            let barrier = Arc::clone(&barrier);
            let shared = shared.clone();
            thread::spawn(move || {
                let signal = if i == 7 { SIGNAL.to_string() } else { format!("signal{}", i) };
                barrier.wait();
                router.try_enqueue(INSTANCE, &signal, &shared, "{}", 1000)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners = results.iter().filter(|r| matches!(r, Ok(true))).count();
    let duplicates = results
        .iter()
        .filter(|r| matches!(r, Err(SignalError::DuplicateUuid(_))))
        .count();

    assert_eq!(winners, 1);
    assert_eq!(duplicates, 7);

    let queued: usize = router.snapshots().iter().map(|s| s.queued).sum();
    assert_eq!(queued, 1);
}

#[test]
fn test_concurrent_producers_and_consumers() {
    let router = printer_router(16);
    let produced = 200;

    let producer = {
        let router = router.clone();
        thread::spawn(move || {
            let mut sent = Vec::with_capacity(produced);
            while sent.len() < produced {
                let id = uuid();
                if router.try_enqueue(INSTANCE, SIGNAL, &id, "{}", 1000).unwrap() {
                    sent.push(id);
                } else {
                    thread::yield_now();
                }
            }
            sent
        })
    };

    let done = Arc::new(AtomicUsize::new(0));
    let consumers: Vec<_> = (0..4)
        .map(|_| {
            let router = router.clone();
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut handled = Vec::new();
                let mut rng = rand::thread_rng();
                while done.load(Ordering::SeqCst) < produced {
                    match router.peek_signal(INSTANCE, SIGNAL).unwrap() {
                        Some(id) => {
                            if router.advance_to_in_process(&id).unwrap() {
                                let moved = if rng.gen_bool(0.25) {
                                    router.advance_to_failed(&id, "{}", "rejected").unwrap()
                                } else {
                                    router.advance_to_handled(&id, "{}").unwrap()
                                };
                                assert!(moved);
                                done.fetch_add(1, Ordering::SeqCst);
                                handled.push(id);
                            }
                        }
                        None => thread::yield_now(),
                    }
                }
                handled
            })
        })
        .collect();

    let sent: HashSet<String> = producer.join().unwrap().into_iter().collect();
    let mut handled = HashSet::new();
    for consumer in consumers {
        for id in consumer.join().unwrap() {
            assert!(handled.insert(id), "signal handled twice");
        }
    }

    assert_eq!(handled, sent);
    for id in &sent {
        let phase = router.phase_of(id).unwrap();
        assert!(matches!(phase, SignalPhase::Handled | SignalPhase::Failed));
    }
    let stats = router.stats();
    assert_eq!(stats.total_handled + stats.total_failed, produced as u64);
}

#[test]
fn test_finalize_then_reenqueue_same_uuid() {
    let router = printer_router(4);

    for _ in 0..200 {
        let id = uuid();
        router.try_enqueue(INSTANCE, SIGNAL, &id, "{}", 1000).unwrap();

        let barrier = Arc::new(Barrier::new(2));
        let finalizer = {
            let router = router.clone();
            let barrier = Arc::clone(&barrier);
            let id = id.clone();
            thread::spawn(move || {
                barrier.wait();
                assert!(router.finalize(&id));
            })
        };

        barrier.wait();
        loop {
            match router.try_enqueue(INSTANCE, SIGNAL, &id, "{}", 1000) {
                Ok(true) => break,
                Ok(false) => panic!("re-enqueue turned away with free capacity"),
                Err(SignalError::DuplicateUuid(_)) => thread::yield_now(),
                Err(other) => panic!("unexpected error: {}", other),
            }
        }
        finalizer.join().unwrap();
        assert!(router.finalize(&id));
    }

    assert_eq!(router.stats().total_rejected, 0);
    assert_eq!(router.live_signal_count(), 0);
}
