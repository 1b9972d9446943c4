//! Capability matching, trait-object resolution and post-processor hooks

use std::sync::{Arc, Mutex};

use wirebox::{
    Binder, Capability, Context, ContextHandle, ContextState, Error, PostProcessor, Result,
};

fn trace_init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

trait Cache: Send + Sync {
    fn backend(&self) -> &'static str;
}

struct RedisCache;
impl Cache for RedisCache {
    fn backend(&self) -> &'static str {
        "redis"
    }
}

struct MemoryCache;
impl Cache for MemoryCache {
    fn backend(&self) -> &'static str {
        "memory"
    }
}

struct CacheUser {
    cache: Arc<dyn Cache>,
}

fn redis_binder() -> Binder {
    Binder::new()
        .qualifier("redis")
        .capability(Capability::of::<RedisCache, dyn Cache>(|c| c))
        .factory(|_| Ok(RedisCache))
}

fn memory_binder() -> Binder {
    Binder::new()
        .qualifier("memory")
        .capability(Capability::of::<MemoryCache, dyn Cache>(|c| c))
        .factory(|_| Ok(MemoryCache))
}

#[test]
fn a_named_capability_dependency_selects_one_implementor() {
    trace_init();
    let mut ctx = Context::new();
    ctx.bind(redis_binder());
    ctx.bind(memory_binder());
    ctx.bind(
        Binder::new()
            .depends_on_capability_named::<dyn Cache>("redis")
            .factory(|args| {
                Ok(CacheUser {
                    cache: args.take_value::<Arc<dyn Cache>>()?,
                })
            }),
    );

    ctx.build().unwrap();
    let user = ctx.get_by_type::<CacheUser>().unwrap();
    assert_eq!(user.cache.backend(), "redis");
}

#[test]
fn an_unqualified_capability_dependency_must_be_unique() {
    trace_init();
    let mut ctx = Context::new();
    ctx.bind(redis_binder());
    ctx.bind(memory_binder());
    ctx.bind(
        Binder::new()
            .depends_on_capability::<dyn Cache>()
            .factory(|args| {
                Ok(CacheUser {
                    cache: args.take_value::<Arc<dyn Cache>>()?,
                })
            }),
    );

    let err = ctx.build().unwrap_err();
    assert!(matches!(err, Error::AmbiguousDependency { .. }), "got {err}");
}

#[test]
fn a_sole_implementor_needs_no_qualifier() {
    trace_init();
    let mut ctx = Context::new();
    ctx.bind(memory_binder());
    ctx.bind(
        Binder::new()
            .depends_on_capability::<dyn Cache>()
            .factory(|args| {
                Ok(CacheUser {
                    cache: args.take_value::<Arc<dyn Cache>>()?,
                })
            }),
    );

    ctx.build().unwrap();
    let user = ctx.get_by_type::<CacheUser>().unwrap();
    assert_eq!(user.cache.backend(), "memory");
}

#[test]
fn all_by_capability_returns_every_implementor() {
    trace_init();
    let mut ctx = Context::new();
    ctx.bind(redis_binder());
    ctx.bind(memory_binder());
    ctx.build().unwrap();

    let mut backends: Vec<&'static str> = ctx
        .all_by_capability::<dyn Cache>()
        .iter()
        .map(|cache| cache.backend())
        .collect();
    backends.sort_unstable();
    assert_eq!(backends, vec!["memory", "redis"]);
}

#[test]
fn all_by_capability_is_empty_without_implementors() {
    trace_init();
    let mut ctx = Context::new();
    ctx.build().unwrap();
    assert!(ctx.all_by_capability::<dyn Cache>().is_empty());
}

#[test]
fn get_by_type_matches_the_exact_produced_type() {
    trace_init();
    let mut ctx = Context::new();
    ctx.bind(redis_binder());
    ctx.build().unwrap();

    assert!(ctx.get_by_type::<RedisCache>().is_some());
    assert!(ctx.get_by_type::<MemoryCache>().is_none());
}

struct Recorder {
    label: &'static str,
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl PostProcessor for Recorder {
    fn post_process(&self, _ctx: &ContextHandle) -> Result<()> {
        self.log.lock().unwrap().push(self.label);
        Ok(())
    }
}

fn recorder_binder(label: &'static str, priority: i32, log: Arc<Mutex<Vec<&'static str>>>) -> Binder {
    Binder::new()
        .priority(priority)
        .qualifier(label)
        .capability(Capability::of::<Recorder, dyn PostProcessor>(|r| r))
        .factory(move |_| {
            Ok(Recorder {
                label,
                log: log.clone(),
            })
        })
}

#[test]
fn post_processors_run_in_construction_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    trace_init();
    let mut ctx = Context::new();
    // lower priority registered first; construction order still wins
    ctx.bind(recorder_binder("second", 5, log.clone()));
    ctx.bind(recorder_binder("first", 10, log.clone()));

    ctx.build().unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
}

struct Inspector {
    seen: Arc<Mutex<Option<&'static str>>>,
}

impl PostProcessor for Inspector {
    fn post_process(&self, ctx: &ContextHandle) -> Result<()> {
        let cache = ctx.get_by_name::<RedisCache>("redis")?;
        *self.seen.lock().unwrap() = Some(cache.backend());
        Ok(())
    }
}

#[test]
fn post_processors_see_the_fully_built_container() {
    let seen = Arc::new(Mutex::new(None));
    trace_init();
    let mut ctx = Context::new();
    ctx.bind(redis_binder());
    let inspector_seen = seen.clone();
    ctx.bind(
        Binder::new()
            .capability(Capability::of::<Inspector, dyn PostProcessor>(|i| i))
            .factory(move |_| {
                Ok(Inspector {
                    seen: inspector_seen.clone(),
                })
            }),
    );

    ctx.build().unwrap();
    assert_eq!(*seen.lock().unwrap(), Some("redis"));
}

struct Saboteur;

impl PostProcessor for Saboteur {
    fn post_process(&self, _ctx: &ContextHandle) -> Result<()> {
        Err(Error::invalid_state("schema migration pending"))
    }
}

#[test]
fn a_post_processor_failure_fails_the_build() {
    trace_init();
    let mut ctx = Context::new();
    ctx.bind(
        Binder::new()
            .capability(Capability::of::<Saboteur, dyn PostProcessor>(|s| s))
            .factory(|_| Ok(Saboteur)),
    );

    let err = ctx.build().unwrap_err();
    assert!(matches!(err, Error::InvalidState { .. }), "got {err}");
    assert_eq!(ctx.state(), ContextState::Failed);
}
