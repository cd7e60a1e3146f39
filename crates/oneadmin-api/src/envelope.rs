use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ApiError, Result};

/// The `{success, message, data}` wrapper every endpoint answers with.
///
/// A few endpoints put extra fields next to `data` (`time` for channel
/// tests, `balance` for balance refreshes, `url` for payments); those land
/// in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Envelope {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data,
            ..Default::default()
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ..Default::default()
        }
    }

    /// Turns `success: false` into [`ApiError::Rejected`].
    pub fn ensure_success(self) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(ApiError::Rejected(self.message))
        }
    }

    /// Decodes `data` after checking `success`.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T> {
        let env = self.ensure_success()?;
        Ok(serde_json::from_value(env.data)?)
    }

    /// Like [`into_data`](Self::into_data) but a missing or `null` payload
    /// becomes `T::default()`.
    pub fn into_data_or_default<T: DeserializeOwned + Default>(self) -> Result<T> {
        let env = self.ensure_success()?;
        if env.data.is_null() {
            return Ok(T::default());
        }
        Ok(serde_json::from_value(env.data)?)
    }

    pub fn extra_f64(&self, key: &str) -> Option<f64> {
        self.extra.get(key).and_then(Value::as_f64)
    }

    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extra_fields_are_kept() {
        let env: Envelope =
            serde_json::from_value(json!({"success": true, "message": "", "time": 1.25}))
                .unwrap();
        assert!(env.data.is_null());
        assert_eq!(env.extra_f64("time"), Some(1.25));
    }

    #[test]
    fn rejected_envelope_surfaces_message() {
        let env = Envelope::fail("channel not found");
        match env.into_data::<Value>() {
            Err(ApiError::Rejected(msg)) => assert_eq!(msg, "channel not found"),
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn null_data_defaults() {
        let list: Vec<String> = Envelope::ok(Value::Null).into_data_or_default().unwrap();
        assert!(list.is_empty());
    }
}
