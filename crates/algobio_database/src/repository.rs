//! PostgreSQL-backed classification repository.

use crate::DatabaseResult;
use crate::connection::{PgPool, create_pool, run_migrations};
use crate::models::{ClassificationRow, NewClassificationRow};
use crate::schema::classifications;
use algobio_core::{ClassificationRecord, NewClassification};
use algobio_error::{DatabaseError, DatabaseErrorKind};
use algobio_interface::ClassificationRepository;
use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use tracing::{debug, info, instrument};

/// Classification store on PostgreSQL.
///
/// Every call checks a connection out of the pool on the blocking thread pool
/// and returns it when done. No transaction spans more than one call.
#[derive(Clone)]
pub struct PgClassificationRepository {
    pool: PgPool,
}

impl PgClassificationRepository {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a pool and bring the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable or a migration fails.
    #[instrument(name = "database.connect", skip(database_url))]
    pub fn connect(database_url: &str, max_size: u32) -> DatabaseResult<Self> {
        let pool = create_pool(database_url, max_size)?;
        let mut conn = pool.get()?;
        run_migrations(&mut conn)?;
        info!(max_size, "Classification store ready");
        Ok(Self::new(pool))
    }

    async fn with_connection<T, F>(&self, op: F) -> DatabaseResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> DatabaseResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> DatabaseResult<T> {
            let mut conn = pool.get()?;
            op(&mut conn)
        })
        .await
        .map_err(|e| {
            DatabaseError::new(DatabaseErrorKind::Query(format!("Task join error: {}", e)))
        })?
    }
}

impl std::fmt::Debug for PgClassificationRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.pool.state();
        f.debug_struct("PgClassificationRepository")
            .field("connections", &state.connections)
            .field("idle_connections", &state.idle_connections)
            .finish()
    }
}

#[async_trait]
impl ClassificationRepository for PgClassificationRepository {
    #[instrument(skip_all, fields(prediction = %record.prediction()))]
    async fn save(&self, record: &NewClassification) -> DatabaseResult<i32> {
        record
            .check_invariants()
            .map_err(|msg| DatabaseError::new(DatabaseErrorKind::Serialization(msg)))?;
        let row = NewClassificationRow::from_new(record, Utc::now().naive_utc())?;

        let id = self
            .with_connection(move |conn| {
                let id = conn.transaction::<i32, diesel::result::Error, _>(|conn| {
                    diesel::insert_into(classifications::table)
                        .values(&row)
                        .returning(classifications::id)
                        .get_result(conn)
                })?;
                Ok(id)
            })
            .await?;

        debug!(id, "Classification saved");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: i32) -> DatabaseResult<ClassificationRecord> {
        self.with_connection(move |conn| {
            let row: ClassificationRow = classifications::table
                .find(id)
                .select(ClassificationRow::as_select())
                .first(conn)?;
            row.into_record()
        })
        .await
    }

    #[instrument(skip(self))]
    async fn list(&self, limit: usize) -> DatabaseResult<Vec<ClassificationRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let records = self
            .with_connection(move |conn| {
                classifications::table
                    .order(classifications::id.desc())
                    .limit(limit)
                    .select(ClassificationRow::as_select())
                    .load::<ClassificationRow>(conn)?
                    .into_iter()
                    .map(ClassificationRow::into_record)
                    .collect::<DatabaseResult<Vec<_>>>()
            })
            .await?;
        debug!(count = records.len(), "Listed classifications");
        Ok(records)
    }
}
