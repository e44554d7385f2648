use std::fmt;

use serde::de::{self, Unexpected, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::{ClientMessage, Rect, ServerMessage, Update, WorkerReport};

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("message has no string `type` field")]
    MissingType,
    #[error("unknown message type: {0}")]
    UnknownType(String),
}

#[derive(Debug, thiserror::Error)]
#[error("update carries neither `workers` nor a legacy `rect`/`area`/`is_contained` triple")]
pub struct UpdateShapeError;

#[derive(Deserialize)]
pub(crate) struct RawUpdate {
    workers: Option<Vec<WorkerReport>>,
    rect: Option<Rect>,
    is_contained: Option<bool>,
    area: Option<f64>,
    current_best: f64,
    #[serde(deserialize_with = "count")]
    checked_count: u64,
}

impl TryFrom<RawUpdate> for Update {
    type Error = UpdateShapeError;

    fn try_from(raw: RawUpdate) -> Result<Self, Self::Error> {
        let workers = match (raw.workers, raw.rect, raw.is_contained, raw.area) {
            (Some(workers), _, _, _) => workers,
            (None, Some(rect), Some(is_contained), Some(area)) => vec![WorkerReport {
                worker_id: 0,
                rect,
                is_contained,
                area,
            }],
            _ => return Err(UpdateShapeError),
        };
        Ok(Update {
            workers,
            current_best: raw.current_best,
            checked_count: raw.checked_count,
        })
    }
}

/// Counts are JSON numbers; an integral float such as `20.0` is the same
/// count as `20`. Negative or fractional values are rejected.
pub(crate) fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    struct CountVisitor;

    impl Visitor<'_> for CountVisitor {
        type Value = u64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a non-negative whole number")
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<u64, E> {
            Ok(value)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<u64, E> {
            u64::try_from(value).map_err(|_| E::invalid_value(Unexpected::Signed(value), &self))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<u64, E> {
            if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64
            {
                Ok(value as u64)
            } else {
                Err(E::invalid_value(Unexpected::Float(value), &self))
            }
        }
    }

    deserializer.deserialize_any(CountVisitor)
}

/// Decodes one inbound text frame. An unrecognised `type` is reported as
/// [`DecodeError::UnknownType`] so callers can tell it apart from a
/// malformed payload.
pub fn decode_server_message(text: &str) -> Result<ServerMessage, DecodeError> {
    let value: Value = serde_json::from_str(text)?;
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingType)?;
    if !ServerMessage::KINDS.contains(&kind) {
        return Err(DecodeError::UnknownType(kind.to_string()));
    }
    Ok(serde_json::from_value(value)?)
}

pub fn encode_client_message(message: &ClientMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}
