use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt::Display};

/// A simulated site. Fixed at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: String,
    pub crop: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Field {
    pub fn new(id: &str, crop: &str, latitude: f64, longitude: f64) -> Self {
        Self { id: id.to_owned(), crop: crop.to_owned(), latitude, longitude }
    }

    /// Second `_`-separated segment: `field_001` -> `001`, `farm_a_1` -> `a`. Ids without a
    /// separator are used whole.
    pub fn suffix(&self) -> &str {
        self.id.split('_').nth(1).unwrap_or(&self.id)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Trend {
    #[default]
    Normal,
    Dry,
    Wet,
    Hot,
}

impl Trend {
    pub const ALL: [Trend; 4] = [Trend::Normal, Trend::Dry, Trend::Wet, Trend::Hot];
}

impl Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let trend = match self {
            Trend::Normal => "normal",
            Trend::Dry => "dry",
            Trend::Wet => "wet",
            Trend::Hot => "hot",
        };
        f.write_str(trend)
    }
}

impl std::str::FromStr for Trend {
    type Err = &'static str;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "normal" => Ok(Trend::Normal),
            "dry" => Ok(Trend::Dry),
            "wet" => Ok(Trend::Wet),
            "hot" => Ok(Trend::Hot),
            _ => Err("Invalid trend"),
        }
    }
}

// HTTP payload

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApiMeasurements {
    pub soil_moisture: f64, // %
    pub temperature: f64,   // °C
    pub humidity: f64,      // %
    pub soil_ph: f64,
    pub light_intensity: f64, // lux
    pub ec: f64,              // dS/m, electrical conductivity
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiReading {
    pub device_id: String,
    pub field_id: String,
    pub timestamp: String,
    pub measurements: ApiMeasurements,
    pub location: GeoPoint,
}

// MQTT payload

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub field_id: String,
    pub crop_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub value: f64,
    pub unit: String,
    pub quality: String,
}

impl Measurement {
    pub fn good(value: f64, unit: &str) -> Self {
        Self { value, unit: unit.to_owned(), quality: "good".to_owned() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub battery_level: i32,   // %
    pub signal_strength: i32, // dBm
    pub last_calibration: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Soil,
    Weather,
}

impl SensorKind {
    pub fn topic(&self, field_id: &str) -> String {
        format!("sensors/{}/{}/data", self, field_id)
    }
}

impl Display for SensorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SensorKind::Soil => "soil",
            SensorKind::Weather => "weather",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub id: String,
    pub device_id: String,
    pub timestamp: String,
    pub location: Location,
    pub measurements: BTreeMap<String, Measurement>,
    pub device_status: DeviceStatus,
}

impl SensorReading {
    pub fn value(&self, name: &str) -> Option<f64> {
        self.measurements.get(name).map(|m| m.value)
    }
}
