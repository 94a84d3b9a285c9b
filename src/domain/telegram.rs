// Telegram domain models
use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};

use super::value::DecodedValue;

/// The recognized telegram fields, one per dispatch table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    VersionInformation,
    TimeStamp,
    EquipmentIdentifier,
    ElectricityDeliveredTariff1,
    ElectricityDeliveredTariff2,
    ElectricityDeliveredByClientTariff1,
    ElectricityDeliveredByClientTariff2,
    TariffIndicator,
    ActualElectricityPowerDelivered,
    ActualElectricityPowerReceived,
    NumberOfPowerFailures,
    NumberOfLongPowerFailures,
    PowerFailureEventLog,
    FormatOfLogEntries,
    NumberOfVoltageSagsL1,
    NumberOfVoltageSagsL2,
    NumberOfVoltageSagsL3,
    NumberOfVoltageSwellsL1,
    NumberOfVoltageSwellsL2,
    NumberOfVoltageSwellsL3,
    TextMessage,
    InstantaneousVoltageL1,
    InstantaneousVoltageL2,
    InstantaneousVoltageL3,
    InstantaneousCurrentL1,
    InstantaneousCurrentL2,
    InstantaneousCurrentL3,
    InstantaneousActivePowerL1Positive,
    InstantaneousActivePowerL2Positive,
    InstantaneousActivePowerL3Positive,
    InstantaneousActivePowerL1Negative,
    InstantaneousActivePowerL2Negative,
    InstantaneousActivePowerL3Negative,
    DeviceType,
    EquipmentIdentifierMbus,
    Last5MinuteValueConnected,
}

impl Field {
    /// The camelCase field label, used both in JSON payloads and in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::VersionInformation => "versionInformation",
            Field::TimeStamp => "timeStamp",
            Field::EquipmentIdentifier => "equipmentIdentifier",
            Field::ElectricityDeliveredTariff1 => "electricityDeliveredTariff1",
            Field::ElectricityDeliveredTariff2 => "electricityDeliveredTariff2",
            Field::ElectricityDeliveredByClientTariff1 => "electricityDeliveredByClientTariff1",
            Field::ElectricityDeliveredByClientTariff2 => "electricityDeliveredByClientTariff2",
            Field::TariffIndicator => "tariffIndicator",
            Field::ActualElectricityPowerDelivered => "actualElectricityPowerDelivered",
            Field::ActualElectricityPowerReceived => "actualElectricityPowerReceived",
            Field::NumberOfPowerFailures => "numberOfPowerFailures",
            Field::NumberOfLongPowerFailures => "numberOfLongPowerFailures",
            Field::PowerFailureEventLog => "powerFailureEventLog",
            Field::FormatOfLogEntries => "formatOfLogEntries",
            Field::NumberOfVoltageSagsL1 => "numberOfVoltageSagsL1",
            Field::NumberOfVoltageSagsL2 => "numberOfVoltageSagsL2",
            Field::NumberOfVoltageSagsL3 => "numberOfVoltageSagsL3",
            Field::NumberOfVoltageSwellsL1 => "numberOfVoltageSwellsL1",
            Field::NumberOfVoltageSwellsL2 => "numberOfVoltageSwellsL2",
            Field::NumberOfVoltageSwellsL3 => "numberOfVoltageSwellsL3",
            Field::TextMessage => "textMessage",
            Field::InstantaneousVoltageL1 => "instantaneousVoltageL1",
            Field::InstantaneousVoltageL2 => "instantaneousVoltageL2",
            Field::InstantaneousVoltageL3 => "instantaneousVoltageL3",
            Field::InstantaneousCurrentL1 => "instantaneousCurrentL1",
            Field::InstantaneousCurrentL2 => "instantaneousCurrentL2",
            Field::InstantaneousCurrentL3 => "instantaneousCurrentL3",
            Field::InstantaneousActivePowerL1Positive => "instantaneousActivePowerL1Positive",
            Field::InstantaneousActivePowerL2Positive => "instantaneousActivePowerL2Positive",
            Field::InstantaneousActivePowerL3Positive => "instantaneousActivePowerL3Positive",
            Field::InstantaneousActivePowerL1Negative => "instantaneousActivePowerL1Negative",
            Field::InstantaneousActivePowerL2Negative => "instantaneousActivePowerL2Negative",
            Field::InstantaneousActivePowerL3Negative => "instantaneousActivePowerL3Negative",
            Field::DeviceType => "deviceType",
            Field::EquipmentIdentifierMbus => "equipmentIdentifierMbus",
            Field::Last5MinuteValueConnected => "last5MinuteValueConnected",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One fully decoded telegram: the verbatim header and end indicator plus
/// at most one value per recognized field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedTelegram {
    pub header: String,
    #[serde(rename = "endIndicator", skip_serializing_if = "Option::is_none")]
    pub end_indicator: Option<String>,
    #[serde(flatten)]
    pub values: HashMap<Field, DecodedValue>,
}

impl ParsedTelegram {
    pub fn numeric(&self, field: Field) -> Option<f64> {
        match self.values.get(&field) {
            Some(DecodedValue::Numeric { value, .. }) => Some(*value),
            _ => None,
        }
    }

    pub fn timestamp(&self, field: Field) -> Option<DateTime<Local>> {
        match self.values.get(&field) {
            Some(DecodedValue::Timestamp(timestamp)) => Some(*timestamp),
            _ => None,
        }
    }

    pub fn five_minute_value(&self, field: Field) -> Option<f64> {
        match self.values.get(&field) {
            Some(DecodedValue::FiveMinuteValue { value, .. }) => Some(*value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value::Measurement;
    use chrono::TimeZone;

    #[test]
    fn test_serializes_fields_as_top_level_camel_case_keys() {
        let timestamp = Local.with_ymd_and_hms(2020, 1, 1, 12, 0, 0).unwrap();
        let mut values = HashMap::new();
        values.insert(
            Field::ElectricityDeliveredTariff1,
            DecodedValue::Numeric {
                value: 2074.842,
                unit: Some("kWh".to_string()),
            },
        );
        values.insert(
            Field::TariffIndicator,
            DecodedValue::Numeric {
                value: 1.0,
                unit: None,
            },
        );
        values.insert(
            Field::PowerFailureEventLog,
            DecodedValue::PowerFailureEvent {
                count: 4,
                obis_code: "0-0:96.7.19".to_string(),
                timestamp,
                duration: Measurement {
                    value: 240.0,
                    unit: "s".to_string(),
                },
            },
        );
        let telegram = ParsedTelegram {
            header: "/Ene5\\XS210 ESMR5.0".to_string(),
            end_indicator: Some("!7B2A".to_string()),
            values,
        };

        let json = serde_json::to_value(&telegram).unwrap();
        assert_eq!(json["header"], "/Ene5\\XS210 ESMR5.0");
        assert_eq!(json["endIndicator"], "!7B2A");
        assert_eq!(json["electricityDeliveredTariff1"]["value"], 2074.842);
        assert_eq!(json["electricityDeliveredTariff1"]["unit"], "kWh");
        // Unitless numerics omit the unit key entirely.
        assert!(json["tariffIndicator"].get("unit").is_none());
        assert_eq!(json["powerFailureEventLog"]["count"], 4);
        assert_eq!(json["powerFailureEventLog"]["obisCode"], "0-0:96.7.19");
        assert_eq!(json["powerFailureEventLog"]["duration"]["unit"], "s");
    }
}
