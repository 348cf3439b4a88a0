//! Reset and boundary-completion behaviour across lifecycle boundaries.
use ferrous_locator::{BoxError, DiError, Implementation, Reinitialize, RegistryConfig, ServiceRegistry};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

trait Router: Send + Sync {
    fn reloads(&self) -> usize;
}

#[derive(Default)]
struct MessageRouter {
    reloads: AtomicUsize,
}

impl Router for MessageRouter {
    fn reloads(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }
}

impl Reinitialize for MessageRouter {
    fn reinitialize(&self) -> Result<(), BoxError> {
        self.reloads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct LevelState {
    reloads: AtomicUsize,
}

impl Reinitialize for LevelState {
    fn reinitialize(&self) -> Result<(), BoxError> {
        self.reloads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct BrokenCache;

impl Reinitialize for BrokenCache {
    fn reinitialize(&self) -> Result<(), BoxError> {
        Err("cache file missing".into())
    }
}

#[derive(Default)]
struct PanickyCache;

impl Reinitialize for PanickyCache {
    fn reinitialize(&self) -> Result<(), BoxError> {
        panic!("poisoned cache");
    }
}

fn router_implementation() -> Implementation<dyn Router, MessageRouter> {
    Implementation::<MessageRouter, MessageRouter>::from_default()
        .survives_reset()
        .reinitializable()
        .bind(|router: Arc<MessageRouter>| router as Arc<dyn Router>)
}

#[test]
fn test_reset_clears_non_survivors() {
    let mut registry = ServiceRegistry::new();
    registry.register_singleton(Implementation::<LevelState, LevelState>::from_default());
    registry.register_singleton(router_implementation());

    registry.resolve::<LevelState>().unwrap();
    let router = registry.resolve::<dyn Router>().unwrap().unwrap();

    registry.reset();

    assert!(registry.resolve::<LevelState>().unwrap().is_none());
    let after = registry.resolve::<dyn Router>().unwrap().unwrap();
    assert!(Arc::ptr_eq(&router, &after));
}

#[test]
fn test_reset_drops_transients() {
    let mut registry = ServiceRegistry::new();
    registry.register_transient(Implementation::<String, String>::new(String::new));

    registry.reset();

    assert!(registry.resolve::<String>().unwrap().is_none());
    assert!(registry.is_empty());
}

#[test]
fn test_unresolved_survivor_does_not_survive() {
    // Survival is a property of cached instances, not of bindings
    let mut registry = ServiceRegistry::new();
    registry.register_singleton(router_implementation());

    registry.reset();

    assert!(!registry.contains::<dyn Router>());
    assert!(registry.resolve::<dyn Router>().unwrap().is_none());
}

#[test]
fn test_survivor_registered_as_instance() {
    let mut registry = ServiceRegistry::new();
    let supplied = Arc::new(MessageRouter::default());
    registry.register_singleton_instance(
        supplied.clone(),
        Implementation::<MessageRouter, MessageRouter>::instance_only().survives_reset(),
    );

    registry.reset();
    registry.reset(); // idempotent for survivors

    let resolved = registry.resolve::<MessageRouter>().unwrap().unwrap();
    assert!(Arc::ptr_eq(&supplied, &resolved));
}

#[test]
fn test_survivor_rebound_with_its_own_implementation() {
    let mut registry = ServiceRegistry::new();
    registry.register_singleton(Implementation::<u32, u32>::new(|| 1).survives_reset());
    registry.resolve::<u32>().unwrap();

    // Rebind to another factory; the cached instance stays
    registry.register_singleton(Implementation::<u32, u32>::new(|| 2));

    registry.reset();

    let descriptor = registry
        .descriptors()
        .into_iter()
        .find(|d| d.type_name() == "u32")
        .unwrap();
    assert!(descriptor.survivor, "binding recreated from the surviving instance");
    assert!(descriptor.materialized);

    // After unregistering, the recreated binding rebuilds with the survivor's factory
    let current = registry.resolve::<u32>().unwrap().unwrap();
    assert!(registry.unregister_singleton(&current));
    assert_eq!(*registry.resolve::<u32>().unwrap().unwrap(), 1);
}

#[test]
fn test_boundary_notification_reach() {
    let mut registry = ServiceRegistry::new();
    registry.register_singleton(router_implementation());
    // Reinitialize implemented but not declared
    registry.register_singleton(Implementation::<LevelState, LevelState>::from_default());

    let router = registry.resolve::<dyn Router>().unwrap().unwrap();
    let level = registry.resolve::<LevelState>().unwrap().unwrap();

    let report = registry.handle_boundary_completion().unwrap();

    assert_eq!(router.reloads(), 1);
    assert_eq!(level.reloads.load(Ordering::SeqCst), 0);
    assert_eq!(report.notified(), 1);
    assert!(report.is_clean());
}

#[test]
fn test_boundary_skips_unconstructed_and_transients() {
    let mut registry = ServiceRegistry::new();
    registry.register_singleton(router_implementation());
    registry.register_transient(Implementation::<LevelState, LevelState>::from_default().reinitializable());

    let transient = registry.resolve::<LevelState>().unwrap().unwrap();

    let report = registry.handle_boundary_completion().unwrap();
    assert_eq!(report.notified(), 0);
    assert_eq!(transient.reloads.load(Ordering::SeqCst), 0);
}

#[test]
fn test_reset_then_boundary() {
    let mut registry = ServiceRegistry::new();
    registry.register_singleton(router_implementation());
    registry.register_singleton(Implementation::<LevelState, LevelState>::from_default().reinitializable());

    let router = registry.resolve::<dyn Router>().unwrap().unwrap();
    let level = registry.resolve::<LevelState>().unwrap().unwrap();

    registry.reset();
    registry.handle_boundary_completion().unwrap();

    assert_eq!(router.reloads(), 1);
    // Discarded by the reset, never notified
    assert_eq!(level.reloads.load(Ordering::SeqCst), 0);
}

#[test]
fn test_failures_isolated_by_default() {
    let mut registry = ServiceRegistry::new();
    registry.register_singleton(router_implementation());
    registry.register_singleton(Implementation::<BrokenCache, BrokenCache>::from_default().reinitializable());
    registry.register_singleton(Implementation::<PanickyCache, PanickyCache>::from_default().reinitializable());

    let router = registry.resolve::<dyn Router>().unwrap().unwrap();
    registry.resolve::<BrokenCache>().unwrap();
    registry.resolve::<PanickyCache>().unwrap();

    let report = registry.handle_boundary_completion().unwrap();

    assert_eq!(router.reloads(), 1);
    assert_eq!(report.notified(), 3);
    assert_eq!(report.failures().len(), 2);

    let reasons: Vec<String> = report.failures().iter().map(|(_, e)| e.to_string()).collect();
    assert!(reasons.iter().any(|r| r.contains("cache file missing")));
    assert!(reasons.iter().any(|r| r.contains("poisoned cache")));
}

#[test]
fn test_failure_aborts_without_isolation() {
    let config = RegistryConfig {
        isolate_reinitialize_failures: false,
        ..RegistryConfig::default()
    };
    let mut registry = ServiceRegistry::with_config(config);
    registry.register_singleton(Implementation::<BrokenCache, BrokenCache>::from_default().reinitializable());
    registry.resolve::<BrokenCache>().unwrap();

    match registry.handle_boundary_completion() {
        Err(DiError::Reinitialize { service, reason }) => {
            assert!(service.ends_with("BrokenCache"));
            assert_eq!(reason, "cache file missing");
        }
        other => panic!("expected reinitialize error, got {:?}", other),
    }
}

#[test]
fn test_repeated_boundaries() {
    let mut registry = ServiceRegistry::new();
    registry.register_singleton(router_implementation());
    let router = registry.resolve::<dyn Router>().unwrap().unwrap();

    for expected in 1..=3 {
        registry.reset();
        registry.handle_boundary_completion().unwrap();
        assert_eq!(router.reloads(), expected);
    }
}

#[tokio::test]
async fn test_handle_boundary_awaits_operation() {
    let mut registry = ServiceRegistry::new();
    registry.register_singleton(router_implementation());
    let router = registry.resolve::<dyn Router>().unwrap().unwrap();

    registry.reset();

    let observed = router.clone();
    let load = async move {
        tokio::task::yield_now().await;
        // Hook has not run while the load is in flight
        observed.reloads()
    };

    let (reloads_during_load, report) = registry.handle_boundary(load).await.unwrap();

    assert_eq!(reloads_during_load, 0);
    assert_eq!(router.reloads(), 1);
    assert_eq!(report.notified(), 1);
}
