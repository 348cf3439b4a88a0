//! Capability traits implemented by registered services and by the host.

mod host;
mod reinitialize;

pub use host::HostContainer;
pub use reinitialize::Reinitialize;
