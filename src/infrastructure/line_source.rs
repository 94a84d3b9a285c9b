// Line sources - transport collaborators feeding the ingest channel
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Reads `\n`-delimited lines from a serial-over-TCP bridge (ser2net or
/// similar in front of the meter's P1 port) and feeds them into the ingest
/// channel. Reconnects after a fixed delay on failure or EOF; returns only
/// once the ingest side is gone.
pub async fn run_tcp_source(addr: String, tx: mpsc::Sender<String>) {
    loop {
        match TcpStream::connect(&addr).await {
            Ok(stream) => {
                tracing::info!("connected to line source at {addr}");
                if !forward_lines(BufReader::new(stream), &tx).await {
                    return;
                }
                tracing::warn!("line source at {addr} closed");
            }
            Err(e) => tracing::warn!("cannot connect to line source at {addr}: {e}"),
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

/// Replays a captured telegram stream from a file, then returns.
pub async fn run_file_source(path: &Path, tx: mpsc::Sender<String>) -> anyhow::Result<()> {
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("cannot open line source file {}", path.display()))?;
    forward_lines(BufReader::new(file), &tx).await;
    Ok(())
}

/// Sends every line, stripped of a trailing `\r`, until EOF or a read
/// error. Returns false when the receiving side has dropped the channel.
async fn forward_lines<R: AsyncRead + Unpin>(reader: BufReader<R>, tx: &mpsc::Sender<String>) -> bool {
    let mut lines = reader.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim_end_matches('\r').to_string();
                if tx.send(line).await.is_err() {
                    return false;
                }
            }
            Ok(None) => return true,
            Err(e) => {
                tracing::warn!("line source read error: {e}");
                return true;
            }
        }
    }
}
