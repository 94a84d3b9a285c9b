// Record parser - decodes a framed telegram into a structured record
use std::collections::HashMap;

use thiserror::Error;

use crate::application::decoders::DecodeError;
use crate::application::dispatch;
use crate::domain::telegram::ParsedTelegram;

/// Terminal failure of a single telegram's parse. The whole telegram is
/// dropped; the stream continues.
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("line {index} has unexpected format {line:?}: {source}")]
    Format {
        index: usize,
        line: String,
        source: DecodeError,
    },
    #[error("line {index} has unrecognized OBIS code {code:?}")]
    UnknownCode { index: usize, code: String },
}

/// Decode a completed telegram. Line 0 is the verbatim header, a leading
/// `!` marks the end indicator, every other line must carry a known OBIS
/// code followed by its parenthesized value groups.
pub fn parse_telegram(lines: &[String]) -> Result<ParsedTelegram, TelegramError> {
    let mut header = String::new();
    let mut end_indicator = None;
    let mut values = HashMap::new();

    for (index, line) in lines.iter().enumerate() {
        if index == 0 {
            header = line.clone();
            continue;
        }
        if line.starts_with('!') {
            end_indicator = Some(line.clone());
            continue;
        }

        let Some((code, _)) = line.split_once('(') else {
            return Err(TelegramError::Format {
                index,
                line: line.clone(),
                source: DecodeError::MissingGroup,
            });
        };
        let Some(entry) = dispatch::lookup(code) else {
            return Err(TelegramError::UnknownCode {
                index,
                code: code.to_string(),
            });
        };
        let value = entry
            .kind
            .decode(line)
            .map_err(|source| TelegramError::Format {
                index,
                line: line.clone(),
                source,
            })?;
        values.insert(entry.field, value);
    }

    Ok(ParsedTelegram {
        header,
        end_indicator,
        values,
    })
}
