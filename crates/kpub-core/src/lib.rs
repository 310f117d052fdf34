//! kpub core - shared infrastructure for the publication database tools
//!
//! Logging, progress reporting, the shared HTTP client/runtime with
//! retry policy, and the Ctrl-C stop flag for batch loops.

pub mod http;
pub mod logging;
pub mod progress;
pub mod retry;
pub mod shutdown;

// Re-exports for convenience
pub use http::{
    ApiError, HttpConfig, SHARED_RUNTIME, http_client, http_config, set_http_config,
};
pub use logging::{IndicatifLogger, Verbosity, init_logging};
pub use progress::{ProgressContext, fmt_num};
pub use retry::{backoff_duration, retry_with_backoff};
pub use shutdown::StopSignal;
