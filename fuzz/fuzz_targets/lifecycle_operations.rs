#![no_main]

use ferrous_locator::{BoxError, Implementation, Reinitialize, ServiceRegistry};
use libfuzzer_sys::fuzz_target;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct Survivor {
    reloads: AtomicU32,
}

impl Reinitialize for Survivor {
    fn reinitialize(&self) -> Result<(), BoxError> {
        self.reloads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct Scratch;

// Drives an arbitrary operation sequence and checks it against a small model.
fuzz_target!(|data: &[u8]| {
    let mut registry = ServiceRegistry::new();

    let mut survivor_bound = false;
    let mut scratch_bound = false;
    let mut survivor: Option<Arc<Survivor>> = None;
    let mut scratch_built = false;
    let mut expected_reloads = 0;

    for byte in data.iter().take(256) {
        match byte % 7 {
            0 => {
                registry.register_singleton(
                    Implementation::<Survivor, Survivor>::from_default()
                        .survives_reset()
                        .reinitializable(),
                );
                survivor_bound = true;
            }
            1 => {
                registry.register_singleton(Implementation::<Scratch, Scratch>::from_default());
                scratch_bound = true;
            }
            2 => {
                let resolved = registry.resolve::<Survivor>().unwrap();
                assert_eq!(resolved.is_some(), survivor_bound);
                if let (Some(resolved), Some(previous)) = (&resolved, &survivor) {
                    assert!(Arc::ptr_eq(resolved, previous));
                }
                if survivor.is_none() {
                    survivor = resolved;
                }
            }
            3 => {
                let resolved = registry.resolve::<Scratch>().unwrap();
                assert_eq!(resolved.is_some(), scratch_bound);
                scratch_built |= resolved.is_some();
            }
            4 => {
                registry.reset();
                survivor_bound = survivor.is_some();
                scratch_bound = false;
                scratch_built = false;
                assert_eq!(registry.is_empty(), !survivor_bound);
            }
            5 => {
                let report = registry.handle_boundary_completion().unwrap();
                assert!(report.is_clean());
                if survivor.is_some() {
                    expected_reloads += 1;
                }
            }
            _ => {
                if let Some(current) = survivor.take() {
                    assert!(registry.unregister_singleton(&current));
                    assert_eq!(current.reloads.load(Ordering::SeqCst), expected_reloads);
                    expected_reloads = 0;
                }
            }
        }

        assert_eq!(registry.is_materialized::<Scratch>(), scratch_built);
    }
});
