use super::{
    Debounce, DebounceGate, Factory, Gcra, HashMemoizer, KeyMemoizer, KeyedThrottle,
    ManualClock, Memoized, Operation, Strategies, Unthrottled, combine,
};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

const WAIT: Duration = Duration::from_millis(100);

fn debounce(clock: &ManualClock) -> Debounce<ManualClock> {
    Debounce::builder()
        .wait(WAIT)
        .clock(clock.clone())
        .build()
        .unwrap()
}

fn counting_target(
    counter: &Arc<AtomicUsize>,
) -> impl Fn(&&'static str) -> usize + Send + Sync + 'static {
    let counter = Arc::clone(counter);
    move |_key| counter.fetch_add(1, Ordering::SeqCst) + 1
}

#[test]
fn test_distinct_keys_are_throttled_independently() {
    let clock = ManualClock::new();
    let counter = Arc::new(AtomicUsize::new(0));
    let limited = combine(
        counting_target(&counter),
        Strategies {
            memoizer: HashMemoizer::new(),
            throttler: debounce(&clock),
        },
    );

    assert!(limited.call("a").is_some());
    assert!(limited.call("b").is_some());
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[test]
fn test_same_key_shares_one_gate() {
    let clock = ManualClock::new();
    let counter = Arc::new(AtomicUsize::new(0));
    let limited = combine(
        counting_target(&counter),
        Strategies {
            memoizer: HashMemoizer::new(),
            throttler: debounce(&clock),
        },
    );

    assert_eq!(limited.call("a"), Some(1));
    assert_eq!(limited.call("a"), None);
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    // Window elapsed: the same gate lets the next call through
    clock.advance(WAIT);
    assert_eq!(limited.call("a"), Some(2));

    let gate = limited.memoized().resolve("a");
    let again = limited.memoized().resolve("a");
    assert!(Arc::ptr_eq(&gate, &again));
    assert_eq!(limited.memoized().len(), 1);
}

#[test]
fn test_target_sees_first_captured_arguments() {
    let clock = ManualClock::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let record = Arc::clone(&seen);

    let limited = KeyedThrottle::new(
        move |args: &(&'static str, u32)| record.lock().push(args.1),
        KeyMemoizer::new(|args: &(&'static str, u32)| args.0),
        debounce(&clock),
    );

    assert!(limited.call(("k", 1)).is_some());
    // Same key, different payload: suppressed and the payload is dropped
    assert!(limited.call(("k", 2)).is_none());

    clock.advance(WAIT);
    // Fires again, still with the payload from the first call
    assert!(limited.call(("k", 3)).is_some());
    assert!(limited.call(("other", 4)).is_some());

    assert_eq!(*seen.lock(), vec![1, 1, 4]);
}

#[test]
fn test_return_value_passes_through() {
    let clock = ManualClock::new();
    let limited = combine(
        |word: &String| word.len(),
        Strategies {
            memoizer: HashMemoizer::new(),
            throttler: debounce(&clock),
        },
    );

    assert_eq!(limited.call("hello".to_string()), Some(5));
    // Suppressed: the debounce's own sentinel comes back untouched
    assert_eq!(limited.call("hello".to_string()), None);
}

#[test]
fn test_unthrottled_returns_plain_result() {
    let limited = combine(
        |n: &u32| n * 2,
        Strategies {
            memoizer: HashMemoizer::new(),
            throttler: Unthrottled,
        },
    );

    assert_eq!(limited.call(21), 42);
    assert_eq!(limited.call(21), 42);
}

#[test]
fn test_custom_suppression_sentinel() {
    // A throttler is free to pick its own absence representation
    let once = |op: Operation<u32>| {
        let fired = AtomicBool::new(false);
        move || {
            if fired.swap(true, Ordering::SeqCst) {
                Err("suppressed")
            } else {
                Ok(op())
            }
        }
    };

    let limited = combine(
        |n: &u32| n + 1,
        Strategies {
            memoizer: HashMemoizer::new(),
            throttler: once,
        },
    );

    assert_eq!(limited.call(1), Ok(2));
    assert_eq!(limited.call(1), Err("suppressed"));
    assert_eq!(limited.call(2), Ok(3));
}

#[test]
fn test_target_error_does_not_affect_other_keys() {
    let clock = ManualClock::new();
    let limited = combine(
        |key: &&'static str| {
            if *key == "bad" {
                Err(format!("{key} failed"))
            } else {
                Ok(key.len())
            }
        },
        Strategies {
            memoizer: HashMemoizer::new(),
            throttler: debounce(&clock),
        },
    );

    assert_eq!(limited.call("bad"), Some(Err("bad failed".to_string())));
    assert_eq!(limited.call("good"), Some(Ok(4)));

    // Both gates are now inside their windows
    assert_eq!(limited.call("bad"), None);
    assert_eq!(limited.call("good"), None);

    clock.advance(WAIT);
    assert_eq!(limited.call("good"), Some(Ok(4)));
    assert_eq!(limited.call("bad"), Some(Err("bad failed".to_string())));
}

#[test]
fn test_target_panic_does_not_affect_other_keys() {
    let clock = ManualClock::new();
    let limited = combine(
        |key: &&'static str| {
            assert!(*key != "boom", "target failed for {key}");
            key.len()
        },
        Strategies {
            memoizer: HashMemoizer::new(),
            throttler: debounce(&clock),
        },
    );

    let result = panic::catch_unwind(AssertUnwindSafe(|| limited.call("boom")));
    assert!(result.is_err());

    assert_eq!(limited.call("fine"), Some(4));
    // The boom gate recorded its call before running the target
    assert_eq!(limited.call("boom"), None);
}

#[test]
fn test_deferred_gate_owns_failures() {
    type Pending = Arc<Mutex<Vec<Arc<Operation<Result<usize, String>>>>>>;

    let pending: Pending = Arc::default();
    let queue = Arc::clone(&pending);

    // Queues every call for later instead of running it
    let deferred = move |op: Operation<Result<usize, String>>| {
        let op = Arc::new(op);
        let queue = Arc::clone(&queue);
        move || {
            queue.lock().push(Arc::clone(&op));
            None::<Result<usize, String>>
        }
    };

    let limited = combine(
        |key: &&'static str| {
            if *key == "bad" {
                Err("bad failed".to_string())
            } else {
                Ok(key.len())
            }
        },
        Strategies {
            memoizer: HashMemoizer::new(),
            throttler: deferred,
        },
    );

    // Nothing surfaces at the call site
    assert_eq!(limited.call("bad"), None);
    assert_eq!(limited.call("good"), None);

    let ops: Vec<_> = pending.lock().drain(..).collect();
    let results: Vec<_> = ops.iter().map(|op| (**op)()).collect();
    assert_eq!(results, vec![Err("bad failed".to_string()), Ok(4)]);
}

#[test]
fn test_wrapping_twice_gives_independent_state() {
    let clock = ManualClock::new();
    let counter = Arc::new(AtomicUsize::new(0));
    let strategies = Strategies {
        memoizer: HashMemoizer::new(),
        throttler: debounce(&clock),
    };

    let first = combine(counting_target(&counter), strategies.clone());
    let second = combine(counting_target(&counter), strategies);

    assert!(first.call("a").is_some());
    assert!(second.call("a").is_some());
    assert!(first.call("a").is_none());
    assert!(second.call("a").is_none());
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[test]
fn test_keying_is_the_memoizers_policy() {
    let clock = ManualClock::new();
    let counter = Arc::new(AtomicUsize::new(0));

    // Never caches: every call gets a brand new gate
    let forgetful = |factory: Factory<&'static str, Arc<DebounceGate<usize, ManualClock>>>| {
        move |key: &'static str| factory(key)
    };

    let limited = KeyedThrottle::new(counting_target(&counter), forgetful, debounce(&clock));

    assert!(limited.call("a").is_some());
    assert!(limited.call("a").is_some());
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[test]
fn test_gcra_per_key_bursts() {
    let clock = ManualClock::new();
    let counter = Arc::new(AtomicUsize::new(0));
    let gcra = Gcra::builder()
        .max_burst(2)
        .count_per_period(1)
        .period(Duration::from_secs(1))
        .clock(clock.clone())
        .build()
        .unwrap();

    let limited = combine(
        counting_target(&counter),
        Strategies {
            memoizer: HashMemoizer::new(),
            throttler: gcra,
        },
    );

    assert!(limited.call("a").is_some());
    assert!(limited.call("a").is_some());
    assert!(limited.call("a").is_none());

    // b has its own burst
    assert!(limited.call("b").is_some());
    assert!(limited.call("b").is_some());
    assert!(limited.call("b").is_none());

    clock.advance(Duration::from_secs(1));
    assert!(limited.call("a").is_some());
    assert_eq!(counter.load(Ordering::SeqCst), 5);
}

#[test]
fn test_shared_across_threads() {
    let clock = ManualClock::new();
    let counter = Arc::new(AtomicUsize::new(0));
    let hits = Arc::clone(&counter);

    let limited = Arc::new(combine(
        move |_key: &String| hits.fetch_add(1, Ordering::SeqCst),
        Strategies {
            memoizer: HashMemoizer::new(),
            throttler: debounce(&clock),
        },
    ));

    let handles: Vec<_> = (0..8)
        .map(|thread| {
            let limited = Arc::clone(&limited);
            std::thread::spawn(move || {
                for _ in 0..10 {
                    limited.call(format!("worker_{thread}"));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // One leading-edge call per key, everything else debounced
    assert_eq!(counter.load(Ordering::SeqCst), 8);
    assert_eq!(limited.memoized().len(), 8);
}
