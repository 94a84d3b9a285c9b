// InfluxDB repository implementation
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;

use crate::application::reading_store::ReadingStore;
use crate::domain::reading::{MeterReading, ReadingRow};

const MEASUREMENT: &str = "p1_telegram";

#[derive(Debug, Clone)]
pub struct InfluxRepository {
    host: String,
    token: String,
    database: String,
    retention_policy: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResponse {
    results: Vec<InfluxQLResult>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResult {
    #[serde(default)]
    series: Option<Vec<InfluxQLSeries>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLSeries {
    columns: Vec<String>,
    values: Vec<Vec<serde_json::Value>>,
}

impl InfluxRepository {
    pub fn new(host: String, token: String, database: String, retention_policy: String) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
            token,
            database,
            retention_policy,
            client: reqwest::Client::new(),
        }
    }

    fn build_query_url(&self, query: &str) -> String {
        let encoded_query = urlencoding::encode(query);
        format!(
            "{}/query?db={}&rp={}&q={}",
            self.host, self.database, self.retention_policy, encoded_query
        )
    }

    fn build_write_url(&self) -> String {
        format!(
            "{}/write?db={}&rp={}&precision=ms",
            self.host, self.database, self.retention_policy
        )
    }

    /// One line-protocol point per reading, stamped with the telegram's own
    /// clock in milliseconds.
    fn line_protocol(reading: &MeterReading) -> String {
        let fields = MeterReading::COLUMNS
            .iter()
            .zip(reading.column_values())
            .map(|(column, value)| format!("{column}={value}"))
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{MEASUREMENT} {fields} {}",
            reading.timestamp.timestamp_millis()
        )
    }

    async fn execute_query(&self, query: &str) -> Result<InfluxQLResponse> {
        let url = self.build_query_url(query);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send query to InfluxDB")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("InfluxDB query failed with status {}: {}", status, body);
        }

        let data = response
            .json::<InfluxQLResponse>()
            .await
            .context("Failed to parse InfluxDB response")?;

        // Check for errors in the response
        if let Some(result) = data.results.first() {
            if let Some(error) = &result.error {
                anyhow::bail!("InfluxDB query error: {}", error);
            }
        }

        Ok(data)
    }
}

#[async_trait]
impl ReadingStore for InfluxRepository {
    async fn insert_reading(&self, reading: &MeterReading) -> Result<()> {
        let response = self
            .client
            .post(self.build_write_url())
            .header("Authorization", format!("Token {}", self.token))
            .body(Self::line_protocol(reading))
            .send()
            .await
            .context("Failed to send write to InfluxDB")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("InfluxDB write failed with status {}: {}", status, body);
        }

        Ok(())
    }

    async fn query_columns(
        &self,
        columns: &[String],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ReadingRow>> {
        let projection = columns
            .iter()
            .map(|column| format!("\"{column}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            "SELECT {projection} FROM {MEASUREMENT} WHERE time >= '{}' AND time <= '{}' ORDER BY time ASC",
            from.to_rfc3339_opts(SecondsFormat::Millis, true),
            to.to_rfc3339_opts(SecondsFormat::Millis, true),
        );

        let response = self.execute_query(&query).await?;

        let mut rows = Vec::new();
        if let Some(result) = response.results.first() {
            if let Some(series) = &result.series {
                for s in series {
                    // Map each requested column to its position in the response.
                    let indices: Vec<Option<usize>> = columns
                        .iter()
                        .map(|column| s.columns.iter().position(|c| c == column))
                        .collect();
                    let time_idx = s.columns.iter().position(|c| c == "time").unwrap_or(0);

                    for value_row in &s.values {
                        let Some(time_str) = value_row.get(time_idx).and_then(|v| v.as_str())
                        else {
                            continue;
                        };
                        let Ok(time) = chrono::DateTime::parse_from_rfc3339(time_str) else {
                            continue;
                        };
                        let values = indices
                            .iter()
                            .map(|idx| {
                                idx.and_then(|i| value_row.get(i)).and_then(|v| v.as_f64())
                            })
                            .collect();
                        rows.push(ReadingRow {
                            time_ms: time.timestamp_millis(),
                            values,
                        });
                    }
                }
            }
        }

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn sample_reading() -> MeterReading {
        MeterReading {
            timestamp: Local.with_ymd_and_hms(2020, 1, 1, 12, 0, 0).unwrap(),
            electricity_delivered_tariff1: 2074.842,
            electricity_delivered_tariff2: 1941.259,
            electricity_delivered_by_client_tariff1: 0.0,
            electricity_delivered_by_client_tariff2: 0.0,
            actual_electricity_power_delivered: 0.494,
            actual_electricity_power_received: 0.0,
            instantaneous_voltage_l1: 236.1,
            instantaneous_voltage_l2: 232.9,
            instantaneous_voltage_l3: 229.0,
            last_5_minute_value: 846.719,
        }
    }

    #[test]
    fn test_line_protocol_has_all_columns_and_a_millisecond_timestamp() {
        let line = InfluxRepository::line_protocol(&sample_reading());

        let millis = Local
            .with_ymd_and_hms(2020, 1, 1, 12, 0, 0)
            .unwrap()
            .timestamp_millis();
        assert!(line.starts_with("p1_telegram "));
        assert!(line.ends_with(&format!(" {millis}")));
        assert!(line.contains("electricityDeliveredTariff1=2074.842"));
        assert!(line.contains("instantaneousVoltageL3=229"));
        assert!(line.contains("last5MinuteValueConnectedValue=846.719"));
        // Exactly one space-separated field set, no tags.
        assert_eq!(line.split(' ').count(), 3);
    }

    #[test]
    fn test_build_query_url_encodes_the_query() {
        let repository = InfluxRepository::new(
            "http://localhost:8086/".to_string(),
            "secret".to_string(),
            "smartmeter".to_string(),
            "autogen".to_string(),
        );
        let url = repository.build_query_url("SELECT 1 FROM x");
        assert_eq!(
            url,
            "http://localhost:8086/query?db=smartmeter&rp=autogen&q=SELECT%201%20FROM%20x"
        );
    }
}
