// Persisted meter reading domain models
use chrono::{DateTime, Local};
use thiserror::Error;

use super::telegram::{Field, ParsedTelegram};

/// The flattened record forwarded to the persistence collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct MeterReading {
    pub timestamp: DateTime<Local>,
    pub electricity_delivered_tariff1: f64,
    pub electricity_delivered_tariff2: f64,
    pub electricity_delivered_by_client_tariff1: f64,
    pub electricity_delivered_by_client_tariff2: f64,
    pub actual_electricity_power_delivered: f64,
    pub actual_electricity_power_received: f64,
    pub instantaneous_voltage_l1: f64,
    pub instantaneous_voltage_l2: f64,
    pub instantaneous_voltage_l3: f64,
    pub last_5_minute_value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("telegram is missing field {0}")]
pub struct MissingField(pub Field);

impl MeterReading {
    /// Column names as persisted, in `column_values` order. This is also the
    /// set of columns accepted by range queries.
    pub const COLUMNS: [&'static str; 10] = [
        "electricityDeliveredTariff1",
        "electricityDeliveredTariff2",
        "electricityDeliveredByClientTariff1",
        "electricityDeliveredByClientTariff2",
        "actualElectricityPowerDelivered",
        "actualElectricityPowerReceived",
        "instantaneousVoltageL1",
        "instantaneousVoltageL2",
        "instantaneousVoltageL3",
        "last5MinuteValueConnectedValue",
    ];

    /// Flatten a parsed telegram into the persisted record. Every persisted
    /// field must be present in the telegram.
    pub fn from_telegram(telegram: &ParsedTelegram) -> Result<Self, MissingField> {
        let numeric = |field: Field| telegram.numeric(field).ok_or(MissingField(field));

        Ok(Self {
            timestamp: telegram
                .timestamp(Field::TimeStamp)
                .ok_or(MissingField(Field::TimeStamp))?,
            electricity_delivered_tariff1: numeric(Field::ElectricityDeliveredTariff1)?,
            electricity_delivered_tariff2: numeric(Field::ElectricityDeliveredTariff2)?,
            electricity_delivered_by_client_tariff1: numeric(
                Field::ElectricityDeliveredByClientTariff1,
            )?,
            electricity_delivered_by_client_tariff2: numeric(
                Field::ElectricityDeliveredByClientTariff2,
            )?,
            actual_electricity_power_delivered: numeric(Field::ActualElectricityPowerDelivered)?,
            actual_electricity_power_received: numeric(Field::ActualElectricityPowerReceived)?,
            instantaneous_voltage_l1: numeric(Field::InstantaneousVoltageL1)?,
            instantaneous_voltage_l2: numeric(Field::InstantaneousVoltageL2)?,
            instantaneous_voltage_l3: numeric(Field::InstantaneousVoltageL3)?,
            last_5_minute_value: telegram
                .five_minute_value(Field::Last5MinuteValueConnected)
                .ok_or(MissingField(Field::Last5MinuteValueConnected))?,
        })
    }

    /// Field values in `COLUMNS` order.
    pub fn column_values(&self) -> [f64; 10] {
        [
            self.electricity_delivered_tariff1,
            self.electricity_delivered_tariff2,
            self.electricity_delivered_by_client_tariff1,
            self.electricity_delivered_by_client_tariff2,
            self.actual_electricity_power_delivered,
            self.actual_electricity_power_received,
            self.instantaneous_voltage_l1,
            self.instantaneous_voltage_l2,
            self.instantaneous_voltage_l3,
            self.last_5_minute_value,
        ]
    }
}

/// One row returned from a range query; values are parallel to the
/// requested columns, absent where the store holds no value.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingRow {
    pub time_ms: i64,
    pub values: Vec<Option<f64>>,
}
