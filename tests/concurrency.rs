//! Probe evaluation racing dependency writers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use safe_lifecycle::health::{assess, NotServingReason};
use safe_lifecycle::lifecycle::{DependencyPolicy, LifecycleState};
use safe_lifecycle::{evaluate, ProbeKind, Verdict};

const WRITERS: usize = 4;
const READERS: usize = 4;
const ITERATIONS: usize = 10_000;

#[test]
fn test_readers_never_observe_unwritten_values() {
    let names = ["db", "cache", "queue"];
    let state = Arc::new(LifecycleState::new(names, DependencyPolicy::Strict));
    state.mark_initialized();
    let stop = Arc::new(AtomicBool::new(false));

    // Writers only ever mark "db" and "cache" unhealthy; "queue" stays untouched.
    let writers: Vec<_> = (0..WRITERS)
        .map(|i| {
            let state = Arc::clone(&state);
            thread::spawn(move || {
                for n in 0..ITERATIONS {
                    let name = if (i + n) % 2 == 0 { "db" } else { "cache" };
                    state.set_dependency(name, n % 3 != 0).unwrap();
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..READERS)
        .map(|_| {
            let state = Arc::clone(&state);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut checks = 0u64;
                loop {
                    let snapshot = state.snapshot();
                    assert_eq!(snapshot.dependencies.len(), 3);
                    assert_eq!(snapshot.dependency("queue"), Some(true));
                    assert!(snapshot.initialized);
                    assert!(!snapshot.shutdown_initiated);

                    assert_eq!(
                        evaluate(&ProbeKind::Liveness, &snapshot).unwrap(),
                        Verdict::Serving
                    );
                    let assessment = assess(&ProbeKind::Readiness, &snapshot).unwrap();
                    match assessment.reason {
                        None => assert_eq!(assessment.verdict, Verdict::Serving),
                        Some(NotServingReason::DependencyUnhealthy(name)) => {
                            assert!(name == "db" || name == "cache", "unexpected {name}")
                        }
                        Some(other) => panic!("unexpected reason {other}"),
                    }
                    checks += 1;
                    if stop.load(Ordering::Acquire) {
                        break checks;
                    }
                }
            })
        })
        .collect();

    for writer in writers {
        writer.join().unwrap();
    }
    stop.store(true, Ordering::Release);
    for reader in readers {
        assert!(reader.join().unwrap() > 0);
    }
}

#[test]
fn test_shutdown_is_never_observed_reverting() {
    let state = Arc::new(LifecycleState::new(["db"], DependencyPolicy::Strict));
    state.mark_initialized();

    let reader = {
        let state = Arc::clone(&state);
        thread::spawn(move || {
            let mut seen_shutdown = false;
            for _ in 0..ITERATIONS {
                let verdict = evaluate(&ProbeKind::Liveness, &state.snapshot()).unwrap();
                if seen_shutdown {
                    assert_eq!(verdict, Verdict::NotServing);
                }
                seen_shutdown |= verdict == Verdict::NotServing;
            }
        })
    };

    thread::yield_now();
    assert!(state.initiate_shutdown());
    assert!(!state.initiate_shutdown());
    reader.join().unwrap();

    assert_eq!(
        evaluate(&ProbeKind::Readiness, &state.snapshot()).unwrap(),
        Verdict::NotServing
    );
}
