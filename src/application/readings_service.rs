// Readings service - validated range queries for the HTTP surface
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::application::reading_store::ReadingStore;
use crate::domain::reading::{MeterReading, ReadingRow};

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("at least one column is required")]
    NoColumns,
    #[error("unknown column {0:?}")]
    UnknownColumn(String),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// The result of a range query: the validated columns and their rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingSeries {
    pub columns: Vec<String>,
    pub rows: Vec<ReadingRow>,
}

#[derive(Clone)]
pub struct ReadingsService {
    store: Arc<dyn ReadingStore>,
}

impl ReadingsService {
    pub fn new(store: Arc<dyn ReadingStore>) -> Self {
        Self { store }
    }

    /// Fetch the requested columns over `[from, to]`, defaulting to the
    /// last 24 hours. Columns are validated against the persisted set
    /// before the store is consulted.
    pub async fn query_readings(
        &self,
        columns: Vec<String>,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<ReadingSeries, QueryError> {
        if columns.is_empty() {
            return Err(QueryError::NoColumns);
        }
        for column in &columns {
            if !MeterReading::COLUMNS.contains(&column.as_str()) {
                return Err(QueryError::UnknownColumn(column.clone()));
            }
        }

        let to = to.unwrap_or_else(Utc::now);
        let from = from.unwrap_or_else(|| to - Duration::hours(24));

        let rows = self.store.query_columns(&columns, from, to).await?;
        Ok(ReadingSeries { columns, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::domain::reading::MeterReading;

    /// Store that returns a fixed set of rows and remembers nothing.
    struct StubStore(Vec<ReadingRow>);

    #[async_trait]
    impl ReadingStore for StubStore {
        async fn insert_reading(&self, _reading: &MeterReading) -> anyhow::Result<()> {
            Ok(())
        }

        async fn query_columns(
            &self,
            _columns: &[String],
            _from: DateTime<Utc>,
            _to: DateTime<Utc>,
        ) -> anyhow::Result<Vec<ReadingRow>> {
            Ok(self.0.clone())
        }
    }

    fn service_with_rows(rows: Vec<ReadingRow>) -> ReadingsService {
        ReadingsService::new(Arc::new(StubStore(rows)))
    }

    #[tokio::test]
    async fn test_empty_column_list_is_rejected() {
        let service = service_with_rows(Vec::new());
        let result = service.query_readings(Vec::new(), None, None).await;
        assert!(matches!(result, Err(QueryError::NoColumns)));
    }

    #[tokio::test]
    async fn test_unknown_column_is_rejected() {
        let service = service_with_rows(Vec::new());
        let result = service
            .query_readings(vec!["voltageL9".to_string()], None, None)
            .await;
        match result {
            Err(QueryError::UnknownColumn(column)) => assert_eq!(column, "voltageL9"),
            other => panic!("expected unknown column error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_known_columns_pass_through_with_rows() {
        let rows = vec![ReadingRow {
            time_ms: 1_577_880_000_000,
            values: vec![Some(2074.842), None],
        }];
        let service = service_with_rows(rows.clone());
        let columns = vec![
            "electricityDeliveredTariff1".to_string(),
            "instantaneousVoltageL1".to_string(),
        ];

        let series = service
            .query_readings(columns.clone(), None, None)
            .await
            .unwrap();
        assert_eq!(series.columns, columns);
        assert_eq!(series.rows, rows);
    }
}
