//! Internal implementation details.

pub(crate) mod panic_guard;

pub(crate) use panic_guard::catch_panic;
