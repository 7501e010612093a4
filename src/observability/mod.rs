// Observability: tracing subscriber setup for hosts that want the default

pub mod logging;

pub use logging::init_logging;
