//! Construction strategies and construction failures.
use ferrous_locator::{AnyArc, BoxError, Construction, DiError, HostContainer, Implementation, RegistryConfig, ServiceRegistry};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct SceneGraph {
    containers: Mutex<Vec<(String, &'static str)>>,
}

impl HostContainer for SceneGraph {
    fn adopt(&self, container_name: &str, implementation: &'static str, _instance: AnyArc) -> Result<(), BoxError> {
        self.containers
            .lock()
            .unwrap()
            .push((container_name.to_string(), implementation));
        Ok(())
    }
}

struct RejectingHost;

impl HostContainer for RejectingHost {
    fn adopt(&self, _container_name: &str, _implementation: &'static str, _instance: AnyArc) -> Result<(), BoxError> {
        Err("scene is unloading".into())
    }
}

#[derive(Default)]
struct MusicPlayer;

#[test]
fn test_host_managed_singleton_is_adopted() {
    let host = Arc::new(SceneGraph::default());
    let mut registry = ServiceRegistry::new().with_host(host.clone());
    registry.register_singleton(Implementation::<MusicPlayer, MusicPlayer>::from_default().host_managed());

    let a = registry.resolve::<MusicPlayer>().unwrap().unwrap();
    let b = registry.resolve::<MusicPlayer>().unwrap().unwrap();
    assert!(Arc::ptr_eq(&a, &b));

    let containers = host.containers.lock().unwrap();
    assert_eq!(containers.len(), 1, "adopted once");
    assert!(containers[0].0.ends_with("MusicPlayer (singleton)"));
    assert!(containers[0].1.ends_with("MusicPlayer"));
}

#[test]
fn test_host_container_suffix_from_config() {
    let host = Arc::new(SceneGraph::default());
    let config = RegistryConfig {
        host_container_suffix: " [service]".to_string(),
        ..RegistryConfig::default()
    };
    let mut registry = ServiceRegistry::with_config(config).with_host(host.clone());
    registry.register_singleton(
        Implementation::<MusicPlayer, MusicPlayer>::from_default().construction(Construction::HostManaged),
    );

    registry.resolve::<MusicPlayer>().unwrap();
    assert!(host.containers.lock().unwrap()[0].0.ends_with("MusicPlayer [service]"));
}

#[test]
fn test_plain_construction_skips_host() {
    let host = Arc::new(SceneGraph::default());
    let mut registry = ServiceRegistry::new().with_host(host.clone());
    registry.register_singleton(Implementation::<MusicPlayer, MusicPlayer>::from_default());

    registry.resolve::<MusicPlayer>().unwrap();
    assert!(host.containers.lock().unwrap().is_empty());
}

#[test]
fn test_transient_ignores_host_managed() {
    let host = Arc::new(SceneGraph::default());
    let mut registry = ServiceRegistry::new().with_host(host.clone());
    registry.register_transient(Implementation::<MusicPlayer, MusicPlayer>::from_default().host_managed());

    assert!(registry.resolve::<MusicPlayer>().unwrap().is_some());
    assert!(host.containers.lock().unwrap().is_empty());
}

#[test]
fn test_host_managed_without_host_fails() {
    let mut registry = ServiceRegistry::new();
    registry.register_singleton(Implementation::<MusicPlayer, MusicPlayer>::from_default().host_managed());

    let err = registry.resolve::<MusicPlayer>().err().expect("construction must fail");
    assert!(matches!(err, DiError::HostUnavailable { .. }));
    assert!(err.is_construction_failure());
    assert!(!registry.is_materialized::<MusicPlayer>());
}

#[test]
fn test_host_rejection_is_construction_failure() {
    let mut registry = ServiceRegistry::new().with_host(Arc::new(RejectingHost));
    registry.register_singleton(Implementation::<MusicPlayer, MusicPlayer>::from_default().host_managed());

    match registry.resolve::<MusicPlayer>() {
        Err(DiError::Construction { reason, .. }) => assert!(reason.contains("scene is unloading")),
        other => panic!("expected construction failure, got {:?}", other.map(|_| ())),
    }
    assert!(!registry.is_materialized::<MusicPlayer>());
}

#[test]
fn test_clear_host() {
    let mut registry = ServiceRegistry::new().with_host(Arc::new(SceneGraph::default()));
    assert!(registry.has_host());
    assert!(registry.clear_host().is_some());
    assert!(!registry.has_host());
}

#[test]
fn test_factory_error_propagates() {
    let mut registry = ServiceRegistry::new();
    registry.register_singleton(Implementation::<MusicPlayer, MusicPlayer>::try_new(|| {
        Err::<MusicPlayer, _>("codec not loaded")
    }));

    match registry.resolve::<MusicPlayer>() {
        Err(DiError::Construction { service, implementation, reason }) => {
            assert!(service.ends_with("MusicPlayer"));
            assert!(implementation.ends_with("MusicPlayer"));
            assert_eq!(reason, "codec not loaded");
        }
        other => panic!("expected construction failure, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_factory_panic_is_construction_failure() {
    let mut registry = ServiceRegistry::new();
    registry.register_transient(Implementation::<MusicPlayer, MusicPlayer>::new(|| {
        panic!("no audio backend")
    }));

    match registry.resolve::<MusicPlayer>() {
        Err(DiError::Construction { reason, .. }) => {
            assert!(reason.contains("factory panicked"));
            assert!(reason.contains("no audio backend"));
        }
        other => panic!("expected construction failure, got {:?}", other.map(|_| ())),
    }

    // The registry stays usable
    registry.register_instance(5u8);
    assert_eq!(*registry.resolve::<u8>().unwrap().unwrap(), 5);
}

#[test]
fn test_failed_singleton_is_retried() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let attempts = Arc::new(AtomicUsize::new(0));
    let attempts_clone = attempts.clone();

    let mut registry = ServiceRegistry::new();
    registry.register_singleton(Implementation::<MusicPlayer, MusicPlayer>::try_new(move || {
        if attempts_clone.fetch_add(1, Ordering::SeqCst) == 0 {
            Err("first attempt fails")
        } else {
            Ok(MusicPlayer)
        }
    }));

    assert!(registry.resolve::<MusicPlayer>().is_err());
    assert!(registry.resolve::<MusicPlayer>().unwrap().is_some());
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}
