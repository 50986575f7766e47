//! Delivery of compacted record groups to the remote HTTP endpoint

pub mod http_forwarder;
pub mod middleware;

pub use http_forwarder::{HttpForwarder, EXPECTED_STATUS, PUBLISHER_HEADER};
pub use middleware::{LoggingMiddleware, MetricsMiddleware, MetricsSnapshot, RepositoryMetrics};

use crate::core::Record;
use crate::error::Result;
use std::future::Future;

/// Sink for decoded record batches.
///
/// A batch either succeeds as a whole or reports the first failure.
pub trait MessageRepository: Send + Sync {
    fn save(&self, records: &[Record]) -> impl Future<Output = Result<()>> + Send;
}
