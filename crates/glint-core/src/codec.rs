//! Telemetry wire codec
//!
//! The instrument→hub wire format is a JSON object with a single
//! `data` field holding a number or string. Everything else on the
//! wire (commands, status literals, rebroadcast readings) is plain
//! text and needs no codec.

use crate::{Error, Result, TelemetryEnvelope};

/// Decode a telemetry envelope from wire text.
///
/// Strict: unknown fields, non-scalar `data`, or non-JSON input all
/// fail. The hub treats a decode failure on an instrument connection
/// as indistinguishable from disconnection.
pub fn decode_telemetry(text: &str) -> Result<TelemetryEnvelope> {
    serde_json::from_str(text).map_err(|e| Error::DecodeError(e.to_string()))
}

/// Encode a telemetry envelope to wire text.
pub fn encode_telemetry(envelope: &TelemetryEnvelope) -> Result<String> {
    serde_json::to_string(envelope).map_err(|e| Error::EncodeError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Scalar;

    #[test]
    fn decode_float_reading() {
        let env = decode_telemetry(r#"{"data": 42.5}"#).unwrap();
        assert_eq!(env.data, Scalar::Float(42.5));
    }

    #[test]
    fn decode_integer_reading() {
        let env = decode_telemetry(r#"{"data": 42}"#).unwrap();
        assert_eq!(env.data, Scalar::Int(42));
    }

    #[test]
    fn decode_string_reading() {
        let env = decode_telemetry(r#"{"data": "12.80\n"}"#).unwrap();
        assert_eq!(env.data, Scalar::Text("12.80\n".into()));
    }

    #[test]
    fn reject_unknown_fields() {
        assert!(decode_telemetry(r#"{"data": 1, "name": "scale"}"#).is_err());
    }

    #[test]
    fn reject_wrong_shape() {
        assert!(decode_telemetry(r#"{"value": 1}"#).is_err());
        assert!(decode_telemetry(r#"{"data": [1, 2]}"#).is_err());
        assert!(decode_telemetry(r#"{"data": null}"#).is_err());
        assert!(decode_telemetry("not json").is_err());
    }

    #[test]
    fn encode_round_trip() {
        let env = TelemetryEnvelope::new(42.5);
        let text = encode_telemetry(&env).unwrap();
        assert_eq!(decode_telemetry(&text).unwrap(), env);
    }
}
