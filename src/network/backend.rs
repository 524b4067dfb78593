//! Backend abstraction

use crate::error::Result;
use crate::results::RawResult;
use crate::search::{Credential, SearchParams};
use async_trait::async_trait;

/// A remote search service that answers a single query per call.
///
/// Implementations perform exactly one attempt and classify its failure;
/// retrying is the dispatcher's job.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Run one search attempt
    async fn fetch(&self, params: &SearchParams, credential: &Credential) -> Result<RawResult>;
}
