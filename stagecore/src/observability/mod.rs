//! Observability utilities.

mod attributes;
mod logging;

pub use attributes::StageSpanAttributes;
pub use logging::{init_tracing, LogFormat};
