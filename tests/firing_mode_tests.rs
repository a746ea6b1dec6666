//! Immediate versus queued dispatch, including triggers fired from inside
//! actions and concurrent callers.

use nested_fsm::core::{CancellationToken, FireContext};
use nested_fsm::{Args, FiringMode, StateMachine};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
enum Phase {
    A,
    B,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
enum Signal {
    X,
    Y,
}

type Log = Arc<Mutex<Vec<&'static str>>>;

type Completions = Arc<Mutex<Vec<(Signal, Phase, Phase)>>>;

/// A -X-> B and B -Y-> A. B's entry action fires Y before logging EnterB.
fn bouncing(mode: FiringMode, log: &Log) -> Arc<StateMachine<Phase, Signal>> {
    bouncing_observed(mode, log, &Completions::default())
}

fn bouncing_observed(
    mode: FiringMode,
    log: &Log,
    completed: &Completions,
) -> Arc<StateMachine<Phase, Signal>> {
    Arc::new_cyclic(|handle: &Weak<StateMachine<Phase, Signal>>| {
        let mut machine = StateMachine::with_firing_mode(Phase::A, mode);
        let (exit_a, enter_a, exit_b, enter_b) = (
            Arc::clone(log),
            Arc::clone(log),
            Arc::clone(log),
            Arc::clone(log),
        );
        let handle = handle.clone();

        machine
            .configure(Phase::A)
            .permit(Signal::X, Phase::B)
            .unwrap()
            .on_entry(move |_, _| {
                enter_a.lock().unwrap().push("EnterA");
                Ok(())
            })
            .on_exit(move |_, _| {
                exit_a.lock().unwrap().push("ExitA");
                Ok(())
            });
        machine
            .configure(Phase::B)
            .permit(Signal::Y, Phase::A)
            .unwrap()
            .on_entry_from(Signal::X, move |ctx, _| {
                if let Some(machine) = handle.upgrade() {
                    machine.fire_ctx(ctx, Signal::Y, Args::none())?;
                }
                enter_b.lock().unwrap().push("EnterB");
                Ok(())
            })
            .on_exit(move |_, _| {
                exit_b.lock().unwrap().push("ExitB");
                Ok(())
            });

        let completed = Arc::clone(completed);
        machine.on_transition_completed(move |_, t| {
            completed.lock().unwrap().push((
                t.trigger.clone(),
                t.source.clone(),
                t.destination.clone(),
            ));
        });
        machine
    })
}

#[test]
fn immediate_mode_nests_inner_fire() {
    let log = Log::default();
    let machine = bouncing(FiringMode::Immediate, &log);

    machine.fire(Signal::X).unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["ExitA", "ExitB", "EnterA", "EnterB"]);
    assert_eq!(machine.state().unwrap(), Phase::A);
}

#[test]
fn queued_mode_defers_inner_fire() {
    let log = Log::default();
    let machine = bouncing(FiringMode::Queued, &log);

    machine.fire(Signal::X).unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["ExitA", "EnterB", "ExitB", "EnterA"]);
    assert_eq!(machine.state().unwrap(), Phase::A);
    assert!(!machine.is_firing());
}

#[test]
fn completed_observer_sees_state_after_nested_fire() {
    let log = Log::default();
    let completed = Completions::default();
    let machine = bouncing_observed(FiringMode::Immediate, &log, &completed);

    machine.fire(Signal::X).unwrap();

    // The inner Y completes first; X then reports where the machine really
    // ended up rather than its configured destination.
    assert_eq!(
        *completed.lock().unwrap(),
        vec![
            (Signal::Y, Phase::B, Phase::A),
            (Signal::X, Phase::A, Phase::A),
        ]
    );
}

#[test]
fn queued_completions_follow_queue_order() {
    let log = Log::default();
    let completed = Completions::default();
    let machine = bouncing_observed(FiringMode::Queued, &log, &completed);

    machine.fire(Signal::X).unwrap();

    assert_eq!(
        *completed.lock().unwrap(),
        vec![
            (Signal::X, Phase::A, Phase::B),
            (Signal::Y, Phase::B, Phase::A),
        ]
    );
}

#[test]
fn cancelled_queued_request_is_skipped() {
    let token = CancellationToken::new();
    let skipped = token.clone();
    let machine = Arc::new_cyclic(|handle: &Weak<StateMachine<Phase, Signal>>| {
        let mut machine = StateMachine::new(Phase::A);
        let handle = handle.clone();
        machine
            .configure(Phase::A)
            .permit(Signal::X, Phase::B)
            .unwrap();
        machine
            .configure(Phase::B)
            .permit(Signal::Y, Phase::A)
            .unwrap()
            .on_entry(move |_, _| {
                if let Some(machine) = handle.upgrade() {
                    // Queued behind the current transition, then cancelled
                    // before it is dispatched.
                    machine.fire_ctx(
                        &FireContext::with_cancellation(skipped.clone()),
                        Signal::Y,
                        Args::none(),
                    )?;
                    skipped.cancel();
                }
                Ok(())
            });
        machine
    });

    machine.fire(Signal::X).unwrap();

    assert!(token.is_cancelled());
    assert_eq!(machine.state().unwrap(), Phase::B);
}

#[test]
fn queued_error_leaves_later_requests_pending() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let machine = Arc::new_cyclic(|handle: &Weak<StateMachine<Phase, Signal>>| {
        let mut machine = StateMachine::new(Phase::A);
        let handle = handle.clone();
        machine
            .configure(Phase::A)
            .permit(Signal::X, Phase::B)
            .unwrap();
        machine
            .configure(Phase::B)
            .permit(Signal::Y, Phase::A)
            .unwrap()
            .on_entry(move |_, _| {
                if let Some(machine) = handle.upgrade() {
                    machine.fire(Signal::Y)?;
                }
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    return Err("first entry fails".into());
                }
                Ok(())
            });
        machine
    });

    assert!(machine.fire(Signal::X).is_err());
    assert_eq!(machine.state().unwrap(), Phase::B);
    assert!(!machine.is_firing());

    // The Y queued by the failed entry runs first, so X finds the machine
    // back in A.
    machine.fire(Signal::X).unwrap();
    assert_eq!(machine.state().unwrap(), Phase::A);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn queued_mode_serializes_concurrent_fires() {
    const FIRES: usize = 200;

    let ticks = Arc::new(AtomicUsize::new(0));
    let busy = Arc::new(AtomicBool::new(false));
    let overlaps = Arc::new(AtomicUsize::new(0));

    let mut machine = StateMachine::with_firing_mode(Phase::A, FiringMode::Queued);
    {
        let (ticks, busy, overlaps) = (Arc::clone(&ticks), Arc::clone(&busy), Arc::clone(&overlaps));
        machine
            .configure(Phase::A)
            .internal_transition(Signal::X, move |_, _| {
                if busy.swap(true, Ordering::SeqCst) {
                    overlaps.fetch_add(1, Ordering::SeqCst);
                }
                ticks.fetch_add(1, Ordering::SeqCst);
                std::thread::yield_now();
                busy.store(false, Ordering::SeqCst);
                Ok(())
            });
    }
    let machine = Arc::new(machine);

    let handles: Vec<_> = (0..FIRES)
        .map(|_| {
            let machine = Arc::clone(&machine);
            tokio::spawn(async move { machine.fire(Signal::X) })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(ticks.load(Ordering::SeqCst), FIRES);
    assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    assert!(!machine.is_firing());
    assert_eq!(machine.state().unwrap(), Phase::A);
}
