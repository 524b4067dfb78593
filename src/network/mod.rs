//! Backend networking module
//!
//! Provides the SerpApi HTTP client and the retrying dispatcher that drives it.

mod backend;
mod client;
mod clock;
mod retry;

pub use backend::Backend;
pub use client::{classify_status, parse_retry_after, SerpApiClient};
pub use clock::{Clock, ManualClock, TokioClock};
pub use retry::{RetryPolicy, RetryingDispatcher};
