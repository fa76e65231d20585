// ABOUTME: HTTP clients for the external data upstreams the tools wrap.
// ABOUTME: Both clients fail open: degraded-but-valid results, never propagated errors.

pub mod calendar;
pub mod environment;

pub use calendar::CalendarClient;
pub use environment::{EnvironmentClient, classify_aqi};
