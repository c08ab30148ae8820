use thiserror::Error;

/// Failure to turn a raw datagram payload into a [`Measurement`].
///
/// Malformed input is an expected condition on an open UDP port, so
/// every variant is recoverable: the receiver logs it and moves on.
///
/// [`Measurement`]: crate::measurement::Measurement
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed measurement payload: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("measurement has an empty sensor_id")]
    EmptySensorId,
}
