// OBIS code dispatch table - routes each line to a field and a decoder
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::application::decoders::{self, DecodeError};
use crate::domain::telegram::Field;
use crate::domain::value::DecodedValue;

/// The decoder applied to a line, one variant per value shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderKind {
    Numeric,
    Text,
    Timestamp,
    PowerFailureEventLog,
    FiveMinuteValue,
}

impl DecoderKind {
    pub fn decode(self, line: &str) -> Result<DecodedValue, DecodeError> {
        match self {
            DecoderKind::Numeric => decoders::decode_numeric(line),
            DecoderKind::Text => decoders::decode_text(line),
            DecoderKind::Timestamp => decoders::decode_timestamp(line),
            DecoderKind::PowerFailureEventLog => decoders::decode_power_failure_event_log(line),
            DecoderKind::FiveMinuteValue => decoders::decode_five_minute_value(line),
        }
    }
}

/// A dispatch table entry: the field a code maps to and how to decode it.
#[derive(Debug, Clone, Copy)]
pub struct DispatchEntry {
    pub field: Field,
    pub kind: DecoderKind,
}

const ENTRIES: &[(&str, Field, DecoderKind)] = &[
    ("1-3:0.2.8", Field::VersionInformation, DecoderKind::Text),
    ("0-0:1.0.0", Field::TimeStamp, DecoderKind::Timestamp),
    ("0-0:96.1.1", Field::EquipmentIdentifier, DecoderKind::Text),
    ("1-0:1.8.1", Field::ElectricityDeliveredTariff1, DecoderKind::Numeric),
    ("1-0:1.8.2", Field::ElectricityDeliveredTariff2, DecoderKind::Numeric),
    ("1-0:2.8.1", Field::ElectricityDeliveredByClientTariff1, DecoderKind::Numeric),
    ("1-0:2.8.2", Field::ElectricityDeliveredByClientTariff2, DecoderKind::Numeric),
    ("0-0:96.14.0", Field::TariffIndicator, DecoderKind::Numeric),
    ("1-0:1.7.0", Field::ActualElectricityPowerDelivered, DecoderKind::Numeric),
    ("1-0:2.7.0", Field::ActualElectricityPowerReceived, DecoderKind::Numeric),
    ("0-0:96.7.21", Field::NumberOfPowerFailures, DecoderKind::Numeric),
    ("0-0:96.7.9", Field::NumberOfLongPowerFailures, DecoderKind::Numeric),
    ("1-0:99.97.0", Field::PowerFailureEventLog, DecoderKind::PowerFailureEventLog),
    ("0-0:96.7.19", Field::FormatOfLogEntries, DecoderKind::Text),
    ("1-0:32.32.0", Field::NumberOfVoltageSagsL1, DecoderKind::Numeric),
    ("1-0:52.32.0", Field::NumberOfVoltageSagsL2, DecoderKind::Numeric),
    ("1-0:72.32.0", Field::NumberOfVoltageSagsL3, DecoderKind::Numeric),
    ("1-0:32.36.0", Field::NumberOfVoltageSwellsL1, DecoderKind::Numeric),
    ("1-0:52.36.0", Field::NumberOfVoltageSwellsL2, DecoderKind::Numeric),
    ("1-0:72.36.0", Field::NumberOfVoltageSwellsL3, DecoderKind::Numeric),
    ("0-0:96.13.0", Field::TextMessage, DecoderKind::Text),
    ("1-0:32.7.0", Field::InstantaneousVoltageL1, DecoderKind::Numeric),
    ("1-0:52.7.0", Field::InstantaneousVoltageL2, DecoderKind::Numeric),
    ("1-0:72.7.0", Field::InstantaneousVoltageL3, DecoderKind::Numeric),
    ("1-0:31.7.0", Field::InstantaneousCurrentL1, DecoderKind::Numeric),
    ("1-0:51.7.0", Field::InstantaneousCurrentL2, DecoderKind::Numeric),
    ("1-0:71.7.0", Field::InstantaneousCurrentL3, DecoderKind::Numeric),
    ("1-0:21.7.0", Field::InstantaneousActivePowerL1Positive, DecoderKind::Numeric),
    ("1-0:41.7.0", Field::InstantaneousActivePowerL2Positive, DecoderKind::Numeric),
    ("1-0:61.7.0", Field::InstantaneousActivePowerL3Positive, DecoderKind::Numeric),
    ("1-0:22.7.0", Field::InstantaneousActivePowerL1Negative, DecoderKind::Numeric),
    ("1-0:42.7.0", Field::InstantaneousActivePowerL2Negative, DecoderKind::Numeric),
    ("1-0:62.7.0", Field::InstantaneousActivePowerL3Negative, DecoderKind::Numeric),
    ("0-1:24.1.0", Field::DeviceType, DecoderKind::Numeric),
    ("0-1:96.1.0", Field::EquipmentIdentifierMbus, DecoderKind::Text),
    ("0-1:24.2.1", Field::Last5MinuteValueConnected, DecoderKind::FiveMinuteValue),
];

static TABLE: LazyLock<HashMap<&'static str, DispatchEntry>> = LazyLock::new(|| {
    let mut table = HashMap::with_capacity(ENTRIES.len());
    for &(code, field, kind) in ENTRIES {
        let previous = table.insert(code, DispatchEntry { field, kind });
        assert!(previous.is_none(), "duplicate OBIS code {code}");
    }
    table
});

/// Exact-match lookup of an OBIS code. No prefix or partial matching.
pub fn lookup(code: &str) -> Option<DispatchEntry> {
    TABLE.get(code).copied()
}
