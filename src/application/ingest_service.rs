// Ingest service - consumes the line stream and forwards sampled readings
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};

use crate::application::framer::TelegramFramer;
use crate::application::parser::parse_telegram;
use crate::application::reading_store::ReadingStore;
use crate::application::sampler::SamplingGate;
use crate::domain::reading::MeterReading;
use crate::domain::telegram::ParsedTelegram;

/// The most recently parsed telegram, shared with the HTTP surface.
pub type SharedTelegram = Arc<RwLock<Option<ParsedTelegram>>>;

pub struct IngestService {
    framer: TelegramFramer,
    gate: SamplingGate,
    store: Arc<dyn ReadingStore>,
    last_telegram: SharedTelegram,
}

impl IngestService {
    pub fn new(
        framer: TelegramFramer,
        gate: SamplingGate,
        store: Arc<dyn ReadingStore>,
        last_telegram: SharedTelegram,
    ) -> Self {
        Self {
            framer,
            gate,
            store,
            last_telegram,
        }
    }

    /// The single consuming loop: every line goes through the framer, and
    /// each completed telegram is parsed, recorded, and forwarded when the
    /// gate admits it. Per-telegram failures are logged and never stop the
    /// loop; it ends only when the line channel closes.
    pub async fn run(mut self, mut lines: mpsc::Receiver<String>) {
        while let Some(line) = lines.recv().await {
            if let Some(telegram) = self.framer.push_line(&line) {
                self.handle_telegram(telegram).await;
            }
        }
        tracing::info!("line channel closed, stopping ingest loop");
    }

    async fn handle_telegram(&mut self, lines: Vec<String>) {
        let telegram = match parse_telegram(&lines) {
            Ok(telegram) => telegram,
            Err(e) => {
                tracing::error!("dropping telegram: {e}");
                return;
            }
        };

        *self.last_telegram.write().await = Some(telegram.clone());

        if !self.gate.admit() {
            return;
        }

        let reading = match MeterReading::from_telegram(&telegram) {
            Ok(reading) => reading,
            Err(e) => {
                tracing::error!("cannot build a reading: {e}");
                return;
            }
        };

        // Forwarding must not hold up framing of the next telegram.
        let store = self.store.clone();
        tokio::spawn(async move {
            match store.insert_reading(&reading).await {
                Ok(()) => {
                    tracing::info!(timestamp = %reading.timestamp, "pushed reading to store");
                }
                Err(e) => tracing::error!("failed to store reading: {e:#}"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    use crate::domain::reading::ReadingRow;

    /// Store that reports every insert on a channel.
    struct ChannelStore(mpsc::UnboundedSender<MeterReading>);

    #[async_trait]
    impl ReadingStore for ChannelStore {
        async fn insert_reading(&self, reading: &MeterReading) -> anyhow::Result<()> {
            let _ = self.0.send(reading.clone());
            Ok(())
        }

        async fn query_columns(
            &self,
            _columns: &[String],
            _from: DateTime<Utc>,
            _to: DateTime<Utc>,
        ) -> anyhow::Result<Vec<ReadingRow>> {
            Ok(Vec::new())
        }
    }

    fn telegram_lines() -> Vec<&'static str> {
        vec![
            "/Ene5\\XS210 ESMR5.0",
            "0-0:1.0.0(200101120000W)",
            "1-0:1.8.1(002074.842*kWh)",
            "1-0:1.8.2(001941.259*kWh)",
            "1-0:2.8.1(000000.000*kWh)",
            "1-0:2.8.2(000000.000*kWh)",
            "1-0:1.7.0(00.494*kW)",
            "1-0:2.7.0(00.000*kW)",
            "1-0:32.7.0(236.1*V)",
            "1-0:52.7.0(232.9*V)",
            "1-0:72.7.0(229.0*V)",
            "0-1:24.2.1(200101120000W)(00846.719*m3)",
            "!7B2A",
        ]
    }

    #[tokio::test]
    async fn test_seven_telegrams_at_density_015_store_one_reading() {
        let (store_tx, mut store_rx) = mpsc::unbounded_channel();
        let (line_tx, line_rx) = mpsc::channel(64);

        let service = IngestService::new(
            TelegramFramer::new("ESMR5.0"),
            SamplingGate::new(0.15),
            Arc::new(ChannelStore(store_tx)),
            Arc::new(RwLock::new(None)),
        );
        let ingest = tokio::spawn(service.run(line_rx));

        for _ in 0..7 {
            for line in telegram_lines() {
                line_tx.send(line.to_string()).await.unwrap();
            }
        }
        drop(line_tx);
        ingest.await.unwrap();

        let reading = store_rx.recv().await.unwrap();
        assert_eq!(reading.electricity_delivered_tariff1, 2074.842);
        assert!(store_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_telegram_does_not_stop_the_loop() {
        let (store_tx, mut store_rx) = mpsc::unbounded_channel();
        let (line_tx, line_rx) = mpsc::channel(64);

        let service = IngestService::new(
            TelegramFramer::new("ESMR5.0"),
            SamplingGate::new(1.0),
            Arc::new(ChannelStore(store_tx)),
            Arc::new(RwLock::new(None)),
        );
        let ingest = tokio::spawn(service.run(line_rx));

        // A telegram with an unrecognized code, then a well-formed one.
        for line in ["/Ene5\\XS210 ESMR5.0", "9-9:9.9.9(foo)", "!0000"] {
            line_tx.send(line.to_string()).await.unwrap();
        }
        for line in telegram_lines() {
            line_tx.send(line.to_string()).await.unwrap();
        }
        drop(line_tx);
        ingest.await.unwrap();

        assert!(store_rx.recv().await.is_some());
        assert!(store_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_last_telegram_is_updated_even_when_the_gate_drops() {
        let (store_tx, _store_rx) = mpsc::unbounded_channel();
        let (line_tx, line_rx) = mpsc::channel(64);
        let last_telegram: SharedTelegram = Arc::new(RwLock::new(None));

        let service = IngestService::new(
            TelegramFramer::new("ESMR5.0"),
            SamplingGate::new(0.15),
            Arc::new(ChannelStore(store_tx)),
            last_telegram.clone(),
        );
        let ingest = tokio::spawn(service.run(line_rx));

        for line in telegram_lines() {
            line_tx.send(line.to_string()).await.unwrap();
        }
        drop(line_tx);
        ingest.await.unwrap();

        let telegram = last_telegram.read().await;
        assert!(telegram.is_some());
    }
}
