use super::ds::{
    ApiMeasurements, ApiReading, DeviceStatus, Field, GeoPoint, Location, Measurement, SensorKind, SensorReading,
    Trend,
};
use crate::utils::{iso_timestamp, round2};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

// Plausible ranges for the HTTP readings. Values are clamped after noise.
pub const SOIL_MOISTURE: Range = Range::new(20., 95.);
pub const TEMPERATURE: Range = Range::new(10., 40.);
pub const HUMIDITY: Range = Range::new(30., 95.);
pub const SOIL_PH: Range = Range::new(5.5, 7.5);
pub const LIGHT_INTENSITY: Range = Range::new(0., 100_000.);
pub const EC: Range = Range::new(0.5, 2.5);

const MOISTURE_NOISE: f64 = 5.;
const TEMPERATURE_NOISE: f64 = 2.;
const HUMIDITY_NOISE: f64 = 5.;
const PH_NOISE: f64 = 0.2;
const LIGHT_DRAW: Range = Range::new(20_000., 80_000.);

/// (name, unit, range) of every soil sensor channel.
pub const SOIL_CHANNELS: [(&str, &str, Range); 4] = [
    ("soil_moisture", "%", Range::new(30., 80.)),
    ("soil_temperature", "°C", Range::new(15., 28.)),
    ("soil_ph", "pH", Range::new(6., 7.5)),
    ("soil_ec", "dS/m", Range::new(0.5, 2.)),
];

pub const WEATHER_CHANNELS: [(&str, &str, Range); 5] = [
    ("air_temperature", "°C", Range::new(18., 32.)),
    ("humidity", "%", Range::new(40., 85.)),
    ("wind_speed", "m/s", Range::new(0., 15.)),
    ("rainfall", "mm", Range::new(0., 5.)),
    ("solar_radiation", "W/m²", Range::new(200., 1000.)),
];

const COORD_JITTER: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    pub moisture: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
}

const POTATO: Baseline = Baseline { moisture: 65., temperature: 18., humidity: 70., ph: 6.2 };
const TOMATO: Baseline = Baseline { moisture: 70., temperature: 24., humidity: 65., ph: 6.5 };
const CORN: Baseline = Baseline { moisture: 75., temperature: 26., humidity: 60., ph: 6.8 };

/// Unknown crops get the potato baseline.
pub fn baseline(crop: &str) -> &'static Baseline {
    match crop {
        "tomato" => &TOMATO,
        "corn" => &CORN,
        _ => &POTATO,
    }
}

/// (moisture, temperature) shift applied on top of the baseline.
pub fn trend_offsets(trend: Trend) -> (f64, f64) {
    match trend {
        Trend::Normal => (0., 0.),
        Trend::Dry => (-15., 3.),
        Trend::Wet => (10., -2.),
        Trend::Hot => (-8., 5.),
    }
}

#[derive(Debug, Clone, Copy)]
struct DeviceProfile {
    battery: (i32, i32),
    signal: (i32, i32),
}

const SOIL_DEVICE: DeviceProfile = DeviceProfile { battery: (60, 100), signal: (-80, -40) };
const WEATHER_DEVICE: DeviceProfile = DeviceProfile { battery: (70, 100), signal: (-75, -45) };

#[derive(Debug)]
pub struct ReadingGenerator {
    rng: StdRng,
}

impl ReadingGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    fn noise(&mut self, amplitude: f64) -> f64 {
        self.rng.gen_range(-amplitude..=amplitude)
    }

    fn draw(&mut self, range: Range) -> f64 {
        self.rng.gen_range(range.min..=range.max)
    }

    pub fn api_reading(&mut self, field: &Field, timestamp: i64, trend: Trend) -> ApiReading {
        let base = baseline(&field.crop);
        let (moisture_adj, temp_adj) = trend_offsets(trend);

        let measurements = ApiMeasurements {
            soil_moisture: SOIL_MOISTURE.clamp(base.moisture + moisture_adj + self.noise(MOISTURE_NOISE)),
            temperature: TEMPERATURE.clamp(base.temperature + temp_adj + self.noise(TEMPERATURE_NOISE)),
            humidity: HUMIDITY.clamp(base.humidity + self.noise(HUMIDITY_NOISE)),
            soil_ph: SOIL_PH.clamp(base.ph + self.noise(PH_NOISE)),
            light_intensity: LIGHT_INTENSITY.clamp(self.draw(LIGHT_DRAW)),
            ec: EC.clamp(self.draw(EC)),
        };

        ApiReading {
            device_id: format!("sensor_{}", field.suffix()),
            field_id: field.id.clone(),
            timestamp: iso_timestamp(timestamp),
            measurements,
            location: GeoPoint { lat: field.latitude, lon: field.longitude },
        }
    }

    pub fn reading(&mut self, kind: SensorKind, field: &Field, timestamp: i64) -> SensorReading {
        match kind {
            SensorKind::Soil => self.soil_reading(field, timestamp),
            SensorKind::Weather => self.weather_reading(field, timestamp),
        }
    }

    pub fn soil_reading(&mut self, field: &Field, timestamp: i64) -> SensorReading {
        let location = Location {
            latitude: field.latitude + self.noise(COORD_JITTER),
            longitude: field.longitude + self.noise(COORD_JITTER),
            field_id: field.id.clone(),
            crop_type: field.crop.clone(),
        };
        self.sensor_reading(SensorKind::Soil, location, &SOIL_CHANNELS, SOIL_DEVICE, timestamp)
    }

    pub fn weather_reading(&mut self, field: &Field, timestamp: i64) -> SensorReading {
        let location = Location {
            latitude: field.latitude,
            longitude: field.longitude,
            field_id: field.id.clone(),
            crop_type: field.crop.clone(),
        };
        self.sensor_reading(SensorKind::Weather, location, &WEATHER_CHANNELS, WEATHER_DEVICE, timestamp)
    }

    fn sensor_reading(
        &mut self, kind: SensorKind, location: Location, channels: &[(&str, &str, Range)], device: DeviceProfile,
        timestamp: i64,
    ) -> SensorReading {
        let mut measurements = BTreeMap::new();
        for (name, unit, range) in channels {
            let value = range.clamp(round2(self.draw(*range)));
            measurements.insert(name.to_string(), Measurement::good(value, unit));
        }

        let device_status = DeviceStatus {
            battery_level: self.rng.gen_range(device.battery.0..=device.battery.1),
            signal_strength: self.rng.gen_range(device.signal.0..=device.signal.1),
            last_calibration: iso_timestamp(timestamp),
        };

        SensorReading {
            id: format!("reading_{}", timestamp),
            device_id: format!("{}_sensor_{}", kind, location.field_id),
            timestamp: iso_timestamp(timestamp),
            location,
            measurements,
            device_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: i64 = 1_732_899_600; // 2024-11-29T17:00:00Z

    fn fields() -> Vec<Field> {
        vec![
            Field::new("field_001", "potato", 40.7128, -74.0060),
            Field::new("field_002", "tomato", 40.7580, -73.9855),
            Field::new("field_003", "corn", 40.7489, -73.9680),
            Field::new("field_404", "quinoa", 0., 0.),
        ]
    }

    #[test]
    fn api_values_stay_in_range_for_every_crop_and_trend() {
        let mut generator = ReadingGenerator::new(Some(7));
        for field in fields() {
            for trend in Trend::ALL {
                for _ in 0..500 {
                    let m = generator.api_reading(&field, TS, trend).measurements;
                    assert!(SOIL_MOISTURE.contains(m.soil_moisture), "moisture {}", m.soil_moisture);
                    assert!(TEMPERATURE.contains(m.temperature), "temperature {}", m.temperature);
                    assert!(HUMIDITY.contains(m.humidity), "humidity {}", m.humidity);
                    assert!(SOIL_PH.contains(m.soil_ph), "ph {}", m.soil_ph);
                    assert!(LIGHT_INTENSITY.contains(m.light_intensity));
                    assert!(EC.contains(m.ec));
                }
            }
        }
    }

    #[test]
    fn sensor_values_stay_in_range() {
        let mut generator = ReadingGenerator::new(Some(11));
        for field in fields() {
            for _ in 0..200 {
                let soil = generator.soil_reading(&field, TS);
                for (name, unit, range) in SOIL_CHANNELS {
                    let m = &soil.measurements[name];
                    assert!(range.contains(m.value), "{} = {}", name, m.value);
                    assert_eq!(m.unit, unit);
                    assert_eq!(m.quality, "good");
                }
                assert!((60..=100).contains(&soil.device_status.battery_level));
                assert!((-80..=-40).contains(&soil.device_status.signal_strength));
                assert!((soil.location.latitude - field.latitude).abs() <= COORD_JITTER + 1e-9);

                let weather = generator.weather_reading(&field, TS);
                for (name, _, range) in WEATHER_CHANNELS {
                    assert!(range.contains(weather.measurements[name].value), "{}", name);
                }
                assert_eq!(weather.location.latitude, field.latitude);
                assert!((70..=100).contains(&weather.device_status.battery_level));
                assert!((-75..=-45).contains(&weather.device_status.signal_strength));
            }
        }
    }

    #[test]
    fn same_seed_same_readings() {
        let field = &fields()[1];
        let mut a = ReadingGenerator::new(Some(42));
        let mut b = ReadingGenerator::new(Some(42));
        for trend in Trend::ALL {
            assert_eq!(a.api_reading(field, TS, trend), b.api_reading(field, TS, trend));
        }
        assert_eq!(a.soil_reading(field, TS), b.soil_reading(field, TS));
        assert_eq!(a.weather_reading(field, TS), b.weather_reading(field, TS));
    }

    #[test]
    fn unknown_crop_uses_potato_baseline() {
        assert_eq!(baseline("quinoa"), baseline("potato"));
        assert_ne!(baseline("corn"), baseline("potato"));
    }

    #[test]
    fn dry_trend_lowers_moisture() {
        // Noise is ±5 and the dry shift is -15, so the two populations never overlap.
        let field = &fields()[2];
        let mut generator = ReadingGenerator::new(Some(3));
        for _ in 0..100 {
            let normal = generator.api_reading(field, TS, Trend::Normal).measurements.soil_moisture;
            let dry = generator.api_reading(field, TS, Trend::Dry).measurements.soil_moisture;
            assert!(normal >= 70. && dry <= 65., "normal {} dry {}", normal, dry);
        }
    }

    #[test]
    fn identities_and_timestamps() {
        let field = &fields()[0];
        let mut generator = ReadingGenerator::new(Some(1));

        let api = generator.api_reading(field, TS, Trend::Normal);
        assert_eq!(api.device_id, "sensor_001");
        assert_eq!(api.timestamp, "2024-11-29T17:00:00Z");
        assert_eq!(api.location, GeoPoint { lat: 40.7128, lon: -74.0060 });

        let soil = generator.reading(SensorKind::Soil, field, TS);
        assert_eq!(soil.id, format!("reading_{}", TS));
        assert_eq!(soil.device_id, "soil_sensor_field_001");
        assert_eq!(soil.location.crop_type, "potato");
        assert_eq!(soil.device_status.last_calibration, soil.timestamp);

        let weather = generator.reading(SensorKind::Weather, field, TS);
        assert_eq!(weather.device_id, "weather_sensor_field_001");
    }

    #[test]
    fn sensor_reading_json_shape() {
        let field = &fields()[0];
        let reading = ReadingGenerator::new(Some(5)).soil_reading(field, TS);
        let json = serde_json::to_value(&reading).unwrap();
        assert_eq!(json["location"]["field_id"], "field_001");
        assert_eq!(json["measurements"]["soil_ph"]["unit"], "pH");
        assert!(json["measurements"]["soil_moisture"]["value"].is_f64());
        assert!(json["device_status"]["battery_level"].is_i64());
    }
}
