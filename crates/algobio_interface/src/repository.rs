//! Classification store trait.

use algobio_core::{ClassificationRecord, NewClassification};
use algobio_error::DatabaseResult;
use async_trait::async_trait;

/// Append-only store of classification records.
///
/// Each call is independently atomic. Records are never updated or deleted
/// through this interface.
#[async_trait]
pub trait ClassificationRepository: Send + Sync {
    /// Persist a new record and return its assigned id.
    ///
    /// Either the whole record is committed or nothing is.
    async fn save(&self, record: &NewClassification) -> DatabaseResult<i32>;

    /// Fetch one record by id.
    ///
    /// Returns [`algobio_error::DatabaseErrorKind::NotFound`] if absent.
    async fn get(&self, id: i32) -> DatabaseResult<ClassificationRecord>;

    /// Most recent records first (descending id), at most `limit` of them.
    async fn list(&self, limit: usize) -> DatabaseResult<Vec<ClassificationRecord>>;
}
