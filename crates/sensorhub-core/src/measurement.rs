use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Physical quantities carried by one sensor report. Units are implied
/// by the sensor schema; no range validation is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementData {
    pub temperature: f32,
    pub humidity: f32,
    pub pressure: f32,
}

/// One decoded sensor reading. Immutable once decoded: a value of this
/// type only exists for payloads that deserialized completely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Stable serial of the reporting sensor; primary key in the store.
    pub sensor_id: String,
    /// Sensor-supplied timestamp, taken as-is (not checked against the
    /// wall clock).
    pub sensor_time: i64,
    /// Opaque per-report id. Carried for a future dedup extension, not
    /// interpreted here.
    pub measurement_id: String,
    pub measurement_data: MeasurementData,
}

impl Measurement {
    /// Decodes a raw datagram payload.
    ///
    /// Accepts any byte sequence, including empty or non-UTF8 input,
    /// and fails with the underlying cause on any structural mismatch.
    /// Partially decoded records are never produced.
    pub fn decode(payload: &[u8]) -> Result<Measurement, DecodeError> {
        let measurement: Measurement = serde_json::from_slice(payload)?;
        if measurement.sensor_id.is_empty() {
            return Err(DecodeError::EmptySensorId);
        }
        Ok(measurement)
    }

    /// Serializes back to the wire form accepted by [`decode`].
    ///
    /// [`decode`]: Measurement::decode
    pub fn encode(&self) -> Result<Vec<u8>, DecodeError> {
        Ok(serde_json::to_vec(self)?)
    }
}
