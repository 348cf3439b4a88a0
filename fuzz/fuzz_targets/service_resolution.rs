#![no_main]

use ferrous_locator::{Implementation, ServiceRegistry};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    let mut registry = ServiceRegistry::new();

    // Use first 4 bytes to determine resolution pattern
    let pattern = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let register_service = pattern % 2 == 0;

    if register_service {
        registry.register_singleton(Implementation::<TestService, TestService>::new(|| TestService { id: 42 }));
        registry.register_singleton_instance(
            Arc::new(TestServiceImpl { value: 100 }),
            Implementation::<TestServiceImpl, TestServiceImpl>::instance_only()
                .bind(|service: Arc<TestServiceImpl>| service as Arc<dyn TestTrait>),
        );
        registry.register_transient(Implementation::<TransientService, TransientService>::new(|| {
            TransientService { data: "transient".to_string() }
        }));
    }

    match (pattern >> 1) % 6 {
        0 => {
            // Lazy singleton
            let service = registry.resolve::<TestService>().unwrap();
            assert_eq!(service.is_some(), register_service);
            if let Some(service) = service {
                assert_eq!(service.id, 42);
            }
        }
        1 => {
            // Existing-only lookup never constructs
            assert!(registry.resolve_existing::<TestService>().unwrap().is_none());
        }
        2 => {
            // Trait capability
            if let Some(trait_obj) = registry.resolve::<dyn TestTrait>().unwrap() {
                assert_eq!(trait_obj.get_value(), 100);
            } else {
                assert!(!register_service);
            }
        }
        3 => {
            // Transients are fresh
            if register_service {
                let a = registry.resolve::<TransientService>().unwrap().unwrap();
                let b = registry.resolve::<TransientService>().unwrap().unwrap();
                assert!(!Arc::ptr_eq(&a, &b));
                assert_eq!(a.data, "transient");
            }
        }
        4 => {
            // Singleton identity
            if register_service {
                let a = registry.resolve::<TestService>().unwrap().unwrap();
                let b = registry.resolve::<TestService>().unwrap().unwrap();
                assert!(Arc::ptr_eq(&a, &b));
            }
        }
        _ => {
            // Reset without survivors empties everything
            registry.reset();
            assert!(registry.is_empty());
            assert!(registry.resolve::<dyn TestTrait>().unwrap().is_none());
        }
    }
});

struct TestService {
    id: u32,
}

trait TestTrait: Send + Sync {
    fn get_value(&self) -> u32;
}

struct TestServiceImpl {
    value: u32,
}

impl TestTrait for TestServiceImpl {
    fn get_value(&self) -> u32 {
        self.value
    }
}

struct TransientService {
    data: String,
}
