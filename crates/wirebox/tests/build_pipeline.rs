//! End-to-end build pipeline tests: ordering, failure modes, lifecycle

use std::sync::{Arc, Mutex};

use wirebox::{Binder, Context, ContextHandle, ContextState, Environment, Error};

type BuildLog = Arc<Mutex<Vec<&'static str>>>;

fn trace_init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

struct Repo;
struct Service {
    _repo: Arc<Repo>,
}
struct Gateway;

#[test]
fn dependencies_construct_before_dependents() {
    let log: BuildLog = Arc::new(Mutex::new(Vec::new()));
    trace_init();
    let mut ctx = Context::new();

    // the dependent registers first; construction order must still be causal
    let service_log = log.clone();
    ctx.bind(Binder::new().depends_on::<Repo>().factory(move |args| {
        service_log.lock().unwrap().push("service");
        Ok(Service {
            _repo: args.take::<Repo>()?,
        })
    }));
    let repo_log = log.clone();
    ctx.bind(Binder::new().factory(move |_| {
        repo_log.lock().unwrap().push("repo");
        Ok(Repo)
    }));

    ctx.build().unwrap();
    assert_eq!(ctx.state(), ContextState::Built);
    assert_eq!(*log.lock().unwrap(), vec!["repo", "service"]);
}

#[test]
fn independent_beans_construct_in_priority_order() {
    struct A;
    struct B;
    struct C;

    let log: BuildLog = Arc::new(Mutex::new(Vec::new()));
    trace_init();
    let mut ctx = Context::new();

    let a_log = log.clone();
    ctx.bind(Binder::new().priority(10).factory(move |_| {
        a_log.lock().unwrap().push("a");
        Ok(A)
    }));
    let b_log = log.clone();
    ctx.bind(Binder::new().priority(5).factory(move |_| {
        b_log.lock().unwrap().push("b");
        Ok(B)
    }));
    let c_log = log.clone();
    ctx.bind(Binder::new().priority(10).factory(move |_| {
        c_log.lock().unwrap().push("c");
        Ok(C)
    }));

    ctx.build().unwrap();
    // equal priorities keep registration order; lower priority comes last
    assert_eq!(*log.lock().unwrap(), vec!["a", "c", "b"]);
}

#[test]
fn cyclic_dependencies_are_rejected() {
    struct Ping;
    struct Pong;

    trace_init();
    let mut ctx = Context::new();
    ctx.bind(Binder::new().depends_on::<Pong>().factory(|args| {
        args.take::<Pong>()?;
        Ok(Ping)
    }));
    ctx.bind(Binder::new().depends_on::<Ping>().factory(|args| {
        args.take::<Ping>()?;
        Ok(Pong)
    }));

    let err = ctx.build().unwrap_err();
    assert!(matches!(err, Error::CyclicDependency { .. }), "got {err}");
    assert_eq!(ctx.state(), ContextState::Failed);
}

#[test]
fn unsatisfied_dependency_fails_the_build() {
    trace_init();
    let mut ctx = Context::new();
    ctx.bind(Binder::new().depends_on::<Repo>().factory(|args| {
        Ok(Service {
            _repo: args.take::<Repo>()?,
        })
    }));

    let err = ctx.build().unwrap_err();
    assert!(
        matches!(err, Error::UnsatisfiedDependency { .. }),
        "got {err}"
    );
    assert_eq!(ctx.state(), ContextState::Failed);
}

#[test]
fn ambiguity_surfaces_at_instantiation() {
    trace_init();
    let mut ctx = Context::new();
    ctx.bind(Binder::new().qualifier("left").factory(|_| Ok(Repo)));
    ctx.bind(Binder::new().qualifier("right").factory(|_| Ok(Repo)));
    ctx.bind(Binder::new().depends_on::<Repo>().factory(|args| {
        Ok(Service {
            _repo: args.take::<Repo>()?,
        })
    }));

    // the graph tolerates multiple candidates; choosing an instance does not
    let err = ctx.build().unwrap_err();
    assert!(matches!(err, Error::AmbiguousDependency { .. }), "got {err}");
    assert_eq!(ctx.state(), ContextState::Failed);
}

#[test]
fn a_factory_error_aborts_the_build() {
    trace_init();
    let mut ctx = Context::new();
    ctx.bind(Binder::new().factory(|_| -> wirebox::Result<Gateway> {
        Err(Error::not_found("upstream endpoint"))
    }));

    let err = ctx.build().unwrap_err();
    assert!(matches!(err, Error::ConstructionFailed { .. }), "got {err}");
    assert_eq!(ctx.state(), ContextState::Failed);
}

#[test]
fn a_second_build_is_rejected() {
    trace_init();
    let mut ctx = Context::new();
    ctx.bind(Binder::new().factory(|_| Ok(Gateway)));
    ctx.build().unwrap();

    let err = ctx.build().unwrap_err();
    assert!(matches!(err, Error::InvalidState { .. }), "got {err}");
    assert_eq!(ctx.state(), ContextState::Built);
}

#[test]
fn binding_after_build_never_resolves() {
    trace_init();
    let mut ctx = Context::new();
    ctx.build().unwrap();

    ctx.bind(Binder::new().qualifier("late").factory(|_| Ok(Gateway)));
    assert!(ctx.get_by_type::<Gateway>().is_none());
}

#[test]
fn bootstrap_beans_are_resolvable() {
    trace_init();
    let mut ctx = Context::new();
    ctx.build().unwrap();

    let handle = ctx.get_by_name::<ContextHandle>("context").unwrap();
    let environment = ctx.get_by_name::<Environment>("environment").unwrap();
    assert_eq!(
        environment.get_property_or_default("absent", "fallback"),
        "fallback"
    );
    assert!(handle.get_by_name::<Environment>("environment").is_ok());
}

#[test]
fn user_beans_may_depend_on_the_bootstrap_beans() {
    struct Introspector {
        handle: Arc<ContextHandle>,
        environment: Arc<Environment>,
    }

    trace_init();
    let mut ctx = Context::new();
    ctx.bind(
        Binder::new()
            .qualifier("introspector")
            .depends_on::<ContextHandle>()
            .depends_on::<Environment>()
            .factory(|args| {
                Ok(Introspector {
                    handle: args.take::<ContextHandle>()?,
                    environment: args.take::<Environment>()?,
                })
            }),
    );
    ctx.build().unwrap();

    let introspector = ctx.get_by_name::<Introspector>("introspector").unwrap();
    assert!(introspector
        .handle
        .get_by_name::<Introspector>("introspector")
        .is_ok());
    assert_eq!(
        introspector
            .environment
            .get_property_or_default("absent", "fallback"),
        "fallback"
    );
}

#[test]
fn nested_binders_resolve_with_their_parent() {
    struct Inner;

    trace_init();
    let mut ctx = Context::new();
    ctx.bind(
        Binder::new()
            .qualifier("outer")
            .factory(|_| Ok(Gateway))
            .nested(Binder::new().qualifier("inner").factory(|_| Ok(Inner))),
    );
    ctx.build().unwrap();

    assert!(ctx.get_by_name::<Gateway>("outer").is_ok());
    assert!(ctx.get_by_name::<Inner>("inner").is_ok());
}

#[test]
fn lookups_require_a_built_context() {
    trace_init();
    let ctx = Context::new();
    assert!(matches!(
        ctx.get_by_name::<Gateway>("gateway"),
        Err(Error::InvalidState { .. })
    ));
    assert!(ctx.get_by_type::<Gateway>().is_none());

    let mut failed = Context::new();
    failed.bind(Binder::new().depends_on::<Repo>().factory(|args| {
        Ok(Service {
            _repo: args.take::<Repo>()?,
        })
    }));
    failed.build().unwrap_err();
    assert!(matches!(
        failed.get_by_name::<Gateway>("gateway"),
        Err(Error::InvalidState { .. })
    ));
    assert!(failed.get_by_type::<Repo>().is_none());
}

#[test]
fn name_lookup_misses_are_not_found() {
    trace_init();
    let mut ctx = Context::new();
    ctx.bind(Binder::new().qualifier("gateway").factory(|_| Ok(Gateway)));
    ctx.build().unwrap();

    assert!(matches!(
        ctx.get_by_name::<Gateway>("no-such-bean"),
        Err(Error::NotFound { .. })
    ));
    // right name, wrong type
    assert!(matches!(
        ctx.get_by_name::<Repo>("gateway"),
        Err(Error::NotFound { .. })
    ));
}
