use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use baton_core::prelude::*;

#[derive(Default)]
struct Widgets {
    calls: u32,
    deny: bool,
}

impl Controller for Widgets {
    fn filter_before(&mut self, ctx: &mut Context<'_>) -> Option<Value> {
        self.calls += 1;
        if self.deny || ctx.param("id") == Some("0") {
            return Some(json!("widget zero is reserved"));
        }
        None
    }
}

impl Widgets {
    fn show(&mut self, ctx: &mut Context<'_>) -> HandlerResult {
        self.calls += 1;
        Ok(json!({ "id": ctx.param("id"), "calls": self.calls }))
    }
}

fn widgets_router(instances: Arc<AtomicUsize>) -> Router {
    let mut b = RouterBuilder::new();
    b.controller("Widgets", move |_m| {
        instances.fetch_add(1, Ordering::SeqCst);
        Widgets::default()
    })
    .action("show", Widgets::show)
    .action("count", |w: &mut Widgets, _ctx| Ok(json!(w.calls)));
    b.get("/v1/widgets/[i:id]", "Widgets@show").unwrap();
    b.get(
        "/v1/widgets/[i:id]/audited",
        Endpoint::new("Widgets@show").after("Widgets@count"),
    )
    .unwrap();
    b.build().unwrap()
}

#[test]
fn test_dispatch_controller_action() {
    let router = widgets_router(Arc::new(AtomicUsize::new(0)));

    match router.dispatch(&Request::new("GET", "/v1/widgets/42")) {
        Outcome::Responded(value) => {
            assert_eq!(value["id"], json!("42"));
            // filter_before ran first on the same instance
            assert_eq!(value["calls"], json!(2));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn test_controller_instance_reused_within_dispatch() {
    let instances = Arc::new(AtomicUsize::new(0));
    let router = widgets_router(instances.clone());

    // before hook, action, after hook and the `count` after-filter share one instance
    let outcome = router.dispatch(&Request::new("GET", "/v1/widgets/5/audited"));
    assert!(matches!(outcome, Outcome::Failed(BatonError::FilterShortCircuit { phase: Phase::After, .. })));
    assert_eq!(instances.load(Ordering::SeqCst), 1);

    router.dispatch(&Request::new("GET", "/v1/widgets/6"));
    assert_eq!(instances.load(Ordering::SeqCst), 2);
}

#[test]
fn test_controller_hook_vetoes() {
    let router = widgets_router(Arc::new(AtomicUsize::new(0)));

    match router.dispatch(&Request::new("GET", "/v1/widgets/0")) {
        Outcome::Failed(BatonError::FilterShortCircuit { phase, value }) => {
            assert_eq!(phase, Phase::Before);
            assert_eq!(value, json!("widget zero is reserved"));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn test_not_found() {
    let router = widgets_router(Arc::new(AtomicUsize::new(0)));
    let outcome = router.dispatch(&Request::new("GET", "/v1/widgets/abc"));
    assert!(matches!(outcome, Outcome::NotFound));

    let envelope = router.respond(&Request::new("GET", "/nowhere"));
    assert_eq!(envelope.http_code, 404);
    assert_eq!(envelope.status, "not_found");
}

#[test]
fn test_before_filter_blocks_handler() {
    let invoked = Arc::new(AtomicUsize::new(0));
    let seen = invoked.clone();

    let mut b = RouterBuilder::new();
    b.filter("closed", Arc::new(|_ctx: &mut Context<'_>| Some(json!({"reason": "closed"}))));
    b.get(
        "/shop",
        Endpoint::handler(move |_ctx| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(json!("open"))
        })
        .before("closed"),
    )
    .unwrap();
    let router = b.build().unwrap();

    match router.dispatch(&Request::new("GET", "/shop")) {
        Outcome::Failed(BatonError::FilterShortCircuit { phase, value }) => {
            assert_eq!(phase, Phase::Before);
            assert_eq!(value, json!({"reason": "closed"}));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(invoked.load(Ordering::SeqCst), 0);
}

#[test]
fn test_empty_filter_results_do_not_veto() {
    let mut b = RouterBuilder::new();
    let mut endpoint = Endpoint::handler(|_ctx| Ok(json!({"ok": true})));
    for empty in [json!(null), json!(false), json!(0), json!(""), json!("0"), json!([]), json!({})] {
        endpoint = endpoint.before(Filter::inline(move |_ctx| Some(empty.clone())));
    }
    endpoint = endpoint.before(Filter::inline(|_ctx| None));
    b.get("/calm", endpoint).unwrap();
    let router = b.build().unwrap();

    assert!(router.dispatch(&Request::new("GET", "/calm")).is_responded());
}

#[test]
fn test_after_filter_sees_response_and_vetoes() {
    let mut b = RouterBuilder::new();
    b.get(
        "/report",
        Endpoint::handler(|_ctx| Ok(json!({"rows": 0})))
            .after(Filter::inline(|ctx| match ctx.response() {
                Some(r) if r["rows"] == json!(0) => Some(json!("empty report")),
                _ => None,
            })),
    )
    .unwrap();
    let router = b.build().unwrap();

    match router.dispatch(&Request::new("GET", "/report")) {
        Outcome::Failed(BatonError::FilterShortCircuit { phase, value }) => {
            assert_eq!(phase, Phase::After);
            assert_eq!(value, json!("empty report"));
        }
        other => panic!("unexpected outcome {other:?}"),
    }

    let envelope = router.respond(&Request::new("GET", "/report"));
    assert_eq!(envelope.http_code, 403);
    assert_eq!(envelope.status, "forbidden");
    assert_eq!(envelope.payload.get("message"), Some(&json!("empty report")));
}

#[test]
fn test_filters_run_in_order_and_share_locals() {
    let mut b = RouterBuilder::new();
    b.filter(
        "first",
        Arc::new(|ctx: &mut Context<'_>| -> Option<Value> {
            ctx.insert("trail", json!(["first"]));
            None
        }),
    );
    b.filter(
        "second",
        Arc::new(|ctx: &mut Context<'_>| -> Option<Value> {
            let mut trail = ctx.get("trail").cloned().unwrap_or(json!([]));
            if let Some(items) = trail.as_array_mut() {
                items.push(json!("second"));
            }
            ctx.insert("trail", trail);
            None
        }),
    );
    b.scope(Scope::new("/t").before("first"), |s| {
        s.get(
            "/x",
            Endpoint::handler(|ctx| Ok(json!({ "trail": ctx.get("trail") }))).before("second"),
        )?;
        Ok(())
    })
    .unwrap();
    let router = b.build().unwrap();

    match router.dispatch(&Request::new("GET", "/t/x")) {
        Outcome::Responded(value) => assert_eq!(value["trail"], json!(["first", "second"])),
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn test_handler_sees_route_attrs_and_name() {
    let mut b = RouterBuilder::new();
    b.get(
        "/greet/[:who]",
        Endpoint::handler(|ctx| {
            Ok(json!({
                "who": ctx.param("who"),
                "route": ctx.route_name(),
                "tone": ctx.attr("tone"),
            }))
        })
        .named("greet")
        .attr("tone", "warm"),
    )
    .unwrap();
    let router = b.build().unwrap();

    let envelope = router.respond(&Request::new("GET", "/greet/ada"));
    assert_eq!(envelope.http_code, 200);
    assert_eq!(envelope.status, "success");
    assert_eq!(envelope.payload.get("who"), Some(&json!("ada")));
    assert_eq!(envelope.payload.get("route"), Some(&json!("greet")));
    assert_eq!(envelope.payload.get("tone"), Some(&json!("warm")));
}

#[test]
fn test_build_rejects_unresolvable_targets() {
    let mut b = RouterBuilder::new();
    b.get("/x", "orphan").unwrap();
    assert!(matches!(b.build(), Err(BatonError::InvalidRoute(_))));

    let mut b = RouterBuilder::new();
    b.get("/x", "Ghost@show").unwrap();
    assert!(matches!(b.build(), Err(BatonError::InvalidRoute(_))));

    let mut b = RouterBuilder::new();
    b.controller("Widgets", |_m| Widgets::default());
    b.get("/x", "Widgets@missing").unwrap();
    match b.build() {
        Err(BatonError::InvalidHandler(msg)) => assert!(msg.contains("Widgets@missing")),
        Err(other) => panic!("unexpected error {other}"),
        Ok(_) => panic!("build should fail"),
    }

    let mut b = RouterBuilder::new();
    b.get("/x", Endpoint::handler(|_ctx| Ok(json!(1))).before("nope")).unwrap();
    assert!(matches!(b.build(), Err(BatonError::InvalidHandler(_))));
}

#[test]
fn test_handler_error_becomes_internal_error() {
    let mut b = RouterBuilder::new();
    b.get(
        "/boom",
        Endpoint::handler(|_ctx| Err(BatonError::Internal("database unavailable".into()))),
    )
    .unwrap();
    let router = b.build().unwrap();

    let envelope = router.respond(&Request::new("GET", "/boom"));
    assert_eq!(envelope.http_code, 500);
    assert_eq!(envelope.error, 1);
    assert_eq!(envelope.error_type.as_deref(), Some("internal"));
    assert_eq!(envelope.payload.get("code"), Some(&json!("INTERNAL_ERROR")));
}

#[test]
fn test_router_shared_across_threads() {
    let router = Arc::new(widgets_router(Arc::new(AtomicUsize::new(0))));
    let handles: Vec<_> = (1..=4)
        .map(|i| {
            let router = router.clone();
            std::thread::spawn(move || router.respond(&Request::new("GET", format!("/v1/widgets/{i}"))))
        })
        .collect();

    for handle in handles {
        let envelope = handle.join().unwrap();
        assert_eq!(envelope.http_code, 200);
    }
}

struct Tracer {
    log: Arc<Mutex<Vec<String>>>,
}

impl Tracer {
    fn record(&self, step: &str) {
        self.log.lock().unwrap().push(step.to_string());
    }
}

impl Controller for Tracer {
    fn filter_before(&mut self, _ctx: &mut Context<'_>) -> Option<Value> {
        self.record("hook_before");
        None
    }

    fn filter_after(&mut self, _ctx: &mut Context<'_>) -> Option<Value> {
        self.record("hook_after");
        None
    }

    fn filter(&mut self, phase: Phase, _ctx: &mut Context<'_>) -> Option<Value> {
        self.record(&format!("generic_{phase}"));
        (phase == Phase::After).then(|| json!("no"))
    }
}

#[test]
fn test_controller_hooks_run_before_declared_filters() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut b = RouterBuilder::new();
    let for_filter = log.clone();
    b.filter(
        "named",
        Arc::new(move |_ctx: &mut Context<'_>| -> Option<Value> {
            for_filter.lock().unwrap().push("named".to_string());
            None
        }),
    );
    let for_factory = log.clone();
    b.controller("Tracer", move |_m| Tracer {
        log: for_factory.clone(),
    })
    .action("mark", |t: &mut Tracer, _ctx| {
        t.record("action");
        Ok(json!(null))
    })
    .action("run", |t: &mut Tracer, _ctx| {
        t.record("handler");
        Ok(json!({"ok": true}))
    });
    b.get(
        "/traced",
        Endpoint::new("Tracer@run")
            .before("named")
            .before("Tracer@mark")
            .after("named"),
    )
    .unwrap();
    let router = b.build().unwrap();

    match router.dispatch(&Request::new("GET", "/traced")) {
        Outcome::Failed(BatonError::FilterShortCircuit { phase, value }) => {
            assert_eq!(phase, Phase::After);
            assert_eq!(value, json!("no"));
        }
        other => panic!("unexpected outcome {other:?}"),
    }

    // the generic hook vetoed, so the declared after filter never ran
    assert_eq!(
        *log.lock().unwrap(),
        ["hook_before", "generic_before", "named", "action", "handler", "hook_after", "generic_after"]
    );
}
