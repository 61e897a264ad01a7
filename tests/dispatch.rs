//! Integration tests for the dispatch loop, registration and reset.

use std::error::Error as _;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use topicvisor::{
    Context, ContextError, DispatchError, Dispatcher, Event, ListenerFn, ListenerRef,
    ListenerResult, ListenerSet, Outcome, Phase, Propagation, ProviderFn, ProviderRef, Topic,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
struct Rejected(&'static str);

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rejected: {}", self.0)
    }
}

impl std::error::Error for Rejected {}

fn listener<F>(name: &'static str, f: F) -> ListenerRef<String>
where
    F: Fn(&Context, &mut Event<String>) -> ListenerResult + Send + Sync + 'static,
{
    ListenerFn::arc(name, f)
}

fn provider(listeners: impl IntoIterator<Item = ListenerRef<String>>) -> ProviderRef<String> {
    listeners.into_iter().collect::<ListenerSet<String>>().arc()
}

fn setter(value: &'static str) -> ProviderRef<String> {
    provider([listener(value, move |_, ev| {
        ev.set_data(value.to_string());
        Ok(Propagation::Continue)
    })])
}

fn counter(hits: &Arc<AtomicUsize>) -> ListenerRef<String> {
    let hits = Arc::clone(hits);
    listener("counter", move |_, _| {
        hits.fetch_add(1, Ordering::SeqCst);
        Ok(Propagation::Continue)
    })
}

fn event(topic: &str) -> Event<String> {
    Event::new(topic, String::from("initial"))
}

// ---------------------------------------------------------------------------
// Ordering & no-op
// ---------------------------------------------------------------------------

#[test]
fn no_provider_dispatch_is_idempotent() {
    let d = Dispatcher::<String>::new();
    d.add_provider("other", setter("x"));

    for _ in 0..5 {
        let (ev, res) = d.dispatch(&Context::background(), event("unknown topic"));
        assert!(res.is_ok());
        assert_eq!(ev.data(), "initial");
        assert_eq!(ev.topic().as_str(), "unknown-topic");
    }
}

#[test]
fn later_providers_overwrite_earlier_ones() {
    let d = Dispatcher::<String>::new();
    d.add_provider("t", setter("a")).add_provider("t", setter("b"));

    let (ev, res) = d.dispatch(&Context::background(), event("t"));
    assert!(res.is_ok());
    assert_eq!(ev.data(), "b");
}

#[test]
fn listeners_within_a_provider_run_in_returned_order() {
    let d = Dispatcher::<String>::new();
    let append = |suffix: &'static str| {
        listener(suffix, move |_, ev| {
            ev.data_mut().push_str(suffix);
            Ok(Propagation::Continue)
        })
    };
    d.add_providers(
        "t",
        [
            provider([append("1"), append("2")]),
            provider([append("3")]),
        ],
    );

    let (ev, _) = d.dispatch(&Context::background(), event("t"));
    assert_eq!(ev.data(), "initial123");
}

#[test]
fn duplicate_providers_run_twice() {
    let hits = Arc::new(AtomicUsize::new(0));
    let p = provider([counter(&hits)]);
    let d = Dispatcher::<String>::new();
    d.add_providers("t", [Arc::clone(&p), p]);

    let (_, res) = d.dispatch(&Context::background(), event("t"));
    assert!(res.is_ok());
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[test]
fn provider_fn_sees_the_event_being_dispatched() {
    let d = Dispatcher::<String>::new();
    let loud = listener("loud", |_, ev| {
        let up = ev.data().to_uppercase();
        ev.set_data(up);
        Ok(Propagation::Continue)
    });
    d.add_provider(
        "t",
        ProviderFn::arc("only-initial", move |ev: &Event<String>| {
            if ev.data() == "initial" {
                vec![Arc::clone(&loud)]
            } else {
                Vec::new()
            }
        }),
    );

    let (ev, _) = d.dispatch(&Context::background(), event("t"));
    assert_eq!(ev.data(), "INITIAL");

    let (ev, _) = d.dispatch(&Context::background(), Event::new("t", "other".to_string()));
    assert_eq!(ev.data(), "other");
}

// ---------------------------------------------------------------------------
// Stop sentinel & errors
// ---------------------------------------------------------------------------

#[test]
fn stop_sentinel_halts_cleanly() {
    let hits = Arc::new(AtomicUsize::new(0));
    let d = Dispatcher::<String>::new();
    d.add_providers(
        "t",
        [
            provider([
                listener("stopper", |_, ev| {
                    ev.set_data("stopped".into());
                    Ok(Propagation::Stop)
                }),
                counter(&hits),
            ]),
            provider([counter(&hits)]),
        ],
    );

    let dispatched = d.run(&Context::background(), event("t"));
    assert!(matches!(dispatched.outcome, Outcome::Stopped));
    assert_eq!(dispatched.event.data(), "stopped");
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    let (_, res) = d.dispatch(&Context::background(), event("t"));
    assert!(res.is_ok());
}

#[test]
fn cancellation_takes_precedence_over_stop() {
    let d = Dispatcher::<String>::new();
    d.add_provider(
        "t",
        provider([listener("cancel-and-stop", |ctx, _| {
            ctx.cancel();
            Ok(Propagation::Stop)
        })]),
    );

    let (_, res) = d.dispatch(&Context::background(), event("t"));
    let err = res.expect_err("cancellation must not be reported as a clean stop");
    assert_eq!(err.context_cause(), Some(ContextError::Canceled));
    assert_eq!(err.phase(), Some(Phase::After));
}

#[test]
fn listener_error_surfaces_verbatim() {
    let hits = Arc::new(AtomicUsize::new(0));
    let d = Dispatcher::<String>::new();
    d.add_providers(
        "t",
        [
            provider([listener("reject", |_, ev| {
                ev.set_data("partial".into());
                Err(Box::new(Rejected("bad input")))
            })]),
            provider([counter(&hits)]),
        ],
    );

    let (ev, res) = d.dispatch(&Context::background(), event("t"));
    let err = res.unwrap_err();
    assert!(matches!(err, DispatchError::Listener(_)));
    assert_eq!(err.downcast_listener::<Rejected>(), Some(&Rejected("bad input")));
    assert_eq!(err.to_string(), "rejected: bad input");
    assert_eq!(err.context_cause(), None);
    // developed-so-far event, later listeners skipped
    assert_eq!(ev.data(), "partial");
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn combined_error_reports_both_causes() {
    let d = Dispatcher::<String>::new();
    d.add_provider(
        "t",
        provider([listener("cancel-and-fail", |ctx, _| {
            ctx.cancel();
            Err(Box::new(Rejected("late")))
        })]),
    );

    let (_, res) = d.dispatch(&Context::background(), event("t"));
    let err = res.unwrap_err();
    assert!(matches!(err, DispatchError::Combined { .. }));
    assert!(err.is_canceled());
    assert_eq!(err.phase(), Some(Phase::During));
    assert_eq!(err.downcast_listener::<Rejected>(), Some(&Rejected("late")));

    let msg = err.to_string();
    assert!(msg.contains("rejected: late"), "{msg}");
    assert!(msg.contains("context canceled during"), "{msg}");
}

// ---------------------------------------------------------------------------
// Context handling
// ---------------------------------------------------------------------------

#[test]
fn cancelled_caller_context_halts_before_first_listener() {
    let hits = Arc::new(AtomicUsize::new(0));
    let d = Dispatcher::<String>::new();
    d.add_provider("t", provider([counter(&hits)]));

    let ctx = Context::background();
    ctx.cancel();
    let (ev, res) = d.dispatch(&ctx, event("t"));

    let err = res.unwrap_err();
    assert_eq!(err.phase(), Some(Phase::Before));
    assert!(err.is_canceled());
    assert_eq!(ev.data(), "initial");
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn deadline_expiring_inside_listener_is_reported_after() {
    let d = Dispatcher::<String>::new();
    d.add_provider(
        "t",
        provider([listener("slow", |_, _| {
            thread::sleep(Duration::from_millis(100));
            Ok(Propagation::Continue)
        })]),
    );

    let ctx = Context::background().with_timeout(Duration::from_millis(30));
    let (_, res) = d.dispatch(&ctx, event("t"));
    let err = res.unwrap_err();
    assert!(err.is_deadline_exceeded());
    assert_eq!(err.phase(), Some(Phase::After));
    assert!(err.source().is_some());
}

#[test]
fn deadline_expiring_while_listener_fails_is_combined() {
    let d = Dispatcher::<String>::new();
    d.add_provider(
        "t",
        provider([listener("slow-reject", |_, _| {
            thread::sleep(Duration::from_millis(100));
            Err(Box::new(Rejected("too slow")))
        })]),
    );

    let ctx = Context::background().with_timeout(Duration::from_millis(30));
    let (_, res) = d.dispatch(&ctx, event("t"));
    let err = res.unwrap_err();
    assert!(matches!(
        err,
        DispatchError::Combined {
            cause: ContextError::DeadlineExceeded,
            position: 0,
            ..
        }
    ));
    assert!(err.is_deadline_exceeded());
    assert_eq!(err.phase(), Some(Phase::During));
    assert_eq!(err.downcast_listener::<Rejected>(), Some(&Rejected("too slow")));
    assert_eq!(err.as_label(), "dispatch_listener_failed_context_done");

    let msg = err.to_string();
    assert!(msg.contains("rejected: too slow"), "{msg}");
    assert!(msg.contains("context deadline exceeded during"), "{msg}");
}

#[test]
fn dispatch_scope_is_released_on_return() {
    let captured: Arc<parking_lot::Mutex<Option<Context>>> = Arc::default();
    let slot = Arc::clone(&captured);
    let d = Dispatcher::<String>::new();
    d.add_provider(
        "t",
        provider([listener("capture", move |ctx, _| {
            *slot.lock() = Some(ctx.clone());
            Ok(Propagation::Continue)
        })]),
    );

    let caller = Context::background();
    let (_, res) = d.dispatch(&caller, event("t"));
    assert!(res.is_ok());

    let scope = captured.lock().take().expect("listener ran");
    assert_eq!(scope.err(), Some(ContextError::Canceled));
    assert!(!caller.is_done());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn background_work_ends_with_the_dispatch() {
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let tx = Arc::new(parking_lot::Mutex::new(Some(tx)));
    let handle = tokio::runtime::Handle::current();

    let d = Dispatcher::<String>::new();
    d.add_provider(
        "t",
        provider([listener("spawner", move |ctx, _| {
            let ctx = ctx.clone();
            let tx = tx.lock().take();
            handle.spawn(async move {
                ctx.done().await;
                if let Some(tx) = tx {
                    let _ = tx.send(());
                }
            });
            Ok(Propagation::Continue)
        })]),
    );

    let (_, res) = d.dispatch(&Context::background(), event("t"));
    assert!(res.is_ok());

    tokio::time::timeout(Duration::from_secs(2), rx)
        .await
        .expect("spawned work should observe the released scope")
        .expect("sender kept alive until scope ends");
}

// ---------------------------------------------------------------------------
// Reset
// ---------------------------------------------------------------------------

#[test]
fn reset_without_topics_clears_everything() {
    let d = Dispatcher::<String>::new();
    d.add_provider("a", setter("A")).add_provider("b", setter("B"));

    d.reset(Vec::<Topic>::new());
    assert!(d.topics().is_empty());

    for topic in ["a", "b"] {
        let (ev, res) = d.dispatch(&Context::background(), event(topic));
        assert!(res.is_ok());
        assert_eq!(ev.data(), "initial");
    }
}

#[test]
fn reset_all_clears_everything() {
    let d = Dispatcher::<String>::new();
    d.add_provider("a", setter("A"))
        .add_provider("b", setter("B"))
        .reset_all();

    assert!(d.topics().is_empty());
    assert!(!d.has_providers("a"));
    let (ev, res) = d.dispatch(&Context::background(), event("b"));
    assert!(res.is_ok());
    assert_eq!(ev.data(), "initial");
}

#[test]
fn reset_named_topics_keeps_the_rest() {
    let d = Dispatcher::<String>::new();
    d.add_provider("a", setter("A"))
        .add_provider("b", setter("B"))
        .reset(["a"]);

    assert_eq!(d.topics(), [Topic::new("b")]);

    let (ev, _) = d.dispatch(&Context::background(), event("a"));
    assert_eq!(ev.data(), "initial");
    let (ev, _) = d.dispatch(&Context::background(), event("b"));
    assert_eq!(ev.data(), "B");

    d.reset_all();
    assert!(!d.has_providers("b"));
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn concurrent_registration_never_loses_providers() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 50;

    let d = Dispatcher::<String>::new();
    let barrier = Barrier::new(THREADS);

    thread::scope(|s| {
        for i in 0..THREADS {
            let d = &d;
            let barrier = &barrier;
            s.spawn(move || {
                barrier.wait();
                for _ in 0..PER_THREAD {
                    d.add_provider("shared", setter("x"));
                    d.add_provider(format!("own-{i}"), setter("y"));
                }
            });
        }
    });

    assert_eq!(d.provider_count("shared"), THREADS * PER_THREAD);
    for i in 0..THREADS {
        assert_eq!(d.provider_count(format!("own-{i}")), PER_THREAD);
    }
}

#[test]
fn dispatch_and_registration_run_concurrently() {
    let hits = Arc::new(AtomicUsize::new(0));
    let d = Dispatcher::<String>::new();
    d.add_provider("stable", provider([counter(&hits)]));

    thread::scope(|s| {
        s.spawn(|| {
            for _ in 0..200 {
                d.add_provider("churn", setter("z"));
                d.reset(["churn"]);
            }
        });
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..100 {
                    let (_, res) = d.dispatch(&Context::background(), event("stable"));
                    assert!(res.is_ok());
                }
            });
        }
    });

    assert_eq!(hits.load(Ordering::SeqCst), 400);
    assert_eq!(d.provider_count("stable"), 1);
}

#[test]
fn in_flight_dispatch_does_not_see_new_registrations() {
    let d = Arc::new(Dispatcher::<String>::new());
    let registrar = Arc::downgrade(&d);
    d.add_provider(
        "t",
        provider([listener("register-more", move |_, ev| {
            if let Some(d) = registrar.upgrade() {
                d.add_provider("t", setter("late"));
            }
            ev.set_data("first".into());
            Ok(Propagation::Continue)
        })]),
    );

    let (ev, _) = d.dispatch(&Context::background(), event("t"));
    assert_eq!(ev.data(), "first");
    assert_eq!(d.provider_count("t"), 2);
}
