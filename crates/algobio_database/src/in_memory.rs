//! In-memory implementation of ClassificationRepository.
//!
//! Stores records in a map behind an `RwLock`. Useful for unit tests and for
//! running the service without a database. All data is lost on drop.

use crate::DatabaseResult;
use algobio_core::{ClassificationRecord, NewClassification};
use algobio_error::{DatabaseError, DatabaseErrorKind};
use algobio_interface::ClassificationRepository;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory classification store.
///
/// # Example
/// ```no_run
/// use algobio_database::InMemoryClassificationRepository;
///
/// #[tokio::main]
/// async fn main() {
///     let repo = InMemoryClassificationRepository::new();
///     assert!(repo.is_empty().await);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryClassificationRepository {
    state: Arc<RwLock<State>>,
}

#[derive(Debug, Default)]
struct State {
    next_id: i32,
    records: BTreeMap<i32, ClassificationRecord>,
}

impl InMemoryClassificationRepository {
    /// Create a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    /// Whether nothing has been stored.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.records.is_empty()
    }
}

#[async_trait]
impl ClassificationRepository for InMemoryClassificationRepository {
    async fn save(&self, record: &NewClassification) -> DatabaseResult<i32> {
        record
            .check_invariants()
            .map_err(|msg| DatabaseError::new(DatabaseErrorKind::Serialization(msg)))?;

        // Id assignment and insert happen under one guard.
        let mut state = self.state.write().await;
        state.next_id += 1;
        let id = state.next_id;
        state.records.insert(
            id,
            ClassificationRecord {
                id,
                sequence: record.sequence().clone(),
                label_type: record.label_type().clone(),
                prediction: record.prediction().clone(),
                prob: *record.prob(),
                top_k: record.top_k().clone(),
                reason: record.reason().clone(),
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn get(&self, id: i32) -> DatabaseResult<ClassificationRecord> {
        self.state
            .read()
            .await
            .records
            .get(&id)
            .cloned()
            .ok_or_else(|| DatabaseError::new(DatabaseErrorKind::NotFound))
    }

    async fn list(&self, limit: usize) -> DatabaseResult<Vec<ClassificationRecord>> {
        Ok(self
            .state
            .read()
            .await
            .records
            .values()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }
}
