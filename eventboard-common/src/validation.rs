//! Shape checks for event payloads coming in over HTTP.
//!
//! Only types are checked. The first failing field wins and nothing is aggregated.

use crate::model::event::{EventFields, Location};
use serde_json::{Number, Value};
use thiserror::Error;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Error)]
pub enum InvalidEventField {
    #[error("Please provide a valid location.")]
    Location,
    #[error("Please provide a valid address.")]
    Address,
    #[error("Please provide a valid city.")]
    City,
    #[error("Please provide a valid state.")]
    State,
    #[error("Please provide a valid Zip Code")]
    ZipCode,
    #[error("Please provide a valid event name.")]
    EventName,
    #[error("Please provide a event description.")]
    EventDescription,
}

impl EventFields {
    /// Checks `location`, its four members, `eventName` and `eventDescription`, in that order.
    pub fn from_payload(payload: &Value) -> Result<Self, InvalidEventField> {
        let location = payload
            .get("location")
            .filter(|location| location.is_object())
            .ok_or(InvalidEventField::Location)?;

        let address = string_at(location, "address").ok_or(InvalidEventField::Address)?;
        let city = string_at(location, "city").ok_or(InvalidEventField::City)?;
        let state = string_at(location, "state").ok_or(InvalidEventField::State)?;
        let zip_code = location
            .get("zipCode")
            .and_then(|zip_code| match zip_code {
                Value::Number(number) => Some(zip_code_number(number)),
                _ => None,
            })
            .ok_or(InvalidEventField::ZipCode)?;

        let event_name = string_at(payload, "eventName").ok_or(InvalidEventField::EventName)?;
        let event_description =
            string_at(payload, "eventDescription").ok_or(InvalidEventField::EventDescription)?;

        Ok(Self {
            event_name,
            event_description,
            location: Location {
                address,
                city,
                state,
                zip_code,
            },
        })
    }
}

/// Integers above the signed 64-bit range become doubles, so every store can
/// keep the value as given back by the API.
fn zip_code_number(number: &Number) -> Number {
    if number.is_u64() && number.as_i64().is_none() {
        number
            .as_f64()
            .and_then(Number::from_f64)
            .unwrap_or_else(|| number.clone())
    } else {
        number.clone()
    }
}

fn string_at(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_owned)
}
