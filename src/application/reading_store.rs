// Store trait for persisted meter readings
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::reading::{MeterReading, ReadingRow};

#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Persist one downsampled reading. The store owns uniqueness and
    /// durability; callers log a failure and move on, no retry.
    async fn insert_reading(&self, reading: &MeterReading) -> anyhow::Result<()>;

    /// Fetch the requested columns over a closed time range, oldest first.
    /// Row values are parallel to `columns`.
    async fn query_columns(
        &self,
        columns: &[String],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> anyhow::Result<Vec<ReadingRow>>;
}
