// Telegram framer - carves the raw line stream into discrete telegrams

/// Accumulates raw lines into bounded telegrams: idle until a line carries
/// the header marker, then collecting until a line starting with `!`.
#[derive(Debug)]
pub struct TelegramFramer {
    header_marker: String,
    buffer: Vec<String>,
}

impl TelegramFramer {
    pub fn new(header_marker: impl Into<String>) -> Self {
        Self {
            header_marker: header_marker.into(),
            buffer: Vec::new(),
        }
    }

    /// Feed one line; returns the completed telegram when `line` terminates
    /// one. Lines arriving while idle are discarded unless they carry the
    /// header marker.
    ///
    /// A header line arriving while a telegram is open is kept as ordinary
    /// content; the meter emits telegrams strictly one after another, so an
    /// interleaved header only occurs after a dropped terminator.
    pub fn push_line(&mut self, line: &str) -> Option<Vec<String>> {
        if !self.buffer.is_empty() {
            self.buffer.push(line.to_string());
            if line.starts_with('!') {
                return Some(std::mem::take(&mut self.buffer));
            }
        } else if line.contains(&self.header_marker) {
            self.buffer.push(line.to_string());
        }
        None
    }
}
