use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{AppError, ErrorKind};

// Durable local key-value storage (localStorage on the web shell, a
// keystore-backed file on mobile). Two concerns live here: the user's
// display name and the edit-window starts, plus the last-viewed trip.

pub const MAX_KEY_LENGTH: usize = 512;
pub const MAX_VALUE_SIZE: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreNamespace {
    Identity,
    Session,
    EditWindows,
}

impl StoreNamespace {
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Session => "session",
            Self::EditWindows => "edit_windows",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreKey {
    namespace: StoreNamespace,
    key: String,
}

impl StoreKey {
    pub fn new(namespace: StoreNamespace, key: impl Into<String>) -> Result<Self, StoreError> {
        let key = key.into();
        Self::validate_key(&key)?;
        Ok(Self { namespace, key })
    }

    // Well-known keys used by the app itself.
    #[must_use]
    pub fn user_name() -> Self {
        Self {
            namespace: StoreNamespace::Identity,
            key: "user_name".into(),
        }
    }

    #[must_use]
    pub fn last_trip() -> Self {
        Self {
            namespace: StoreNamespace::Session,
            key: "last_trip_id".into(),
        }
    }

    #[must_use]
    pub fn edit_windows() -> Self {
        Self {
            namespace: StoreNamespace::EditWindows,
            key: "starts".into(),
        }
    }

    #[must_use]
    pub fn raw(&self) -> String {
        format!("{}:{}", self.namespace.prefix(), self.key)
    }

    #[must_use]
    pub const fn namespace(&self) -> StoreNamespace {
        self.namespace
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    fn validate_key(key: &str) -> Result<(), StoreError> {
        if key.trim().is_empty() {
            return Err(StoreError::InvalidKey {
                key: key.to_string(),
                reason: "key cannot be empty".to_string(),
            });
        }

        if key.len() > MAX_KEY_LENGTH {
            return Err(StoreError::InvalidKey {
                key: key.chars().take(50).collect::<String>() + "...",
                reason: format!("key exceeds maximum length of {MAX_KEY_LENGTH} bytes"),
            });
        }

        if key.chars().any(char::is_control) {
            return Err(StoreError::InvalidKey {
                key: key.to_string(),
                reason: "key contains control characters".to_string(),
            });
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", content = "data")]
pub enum StoreOperation {
    Get { key: StoreKey },
    Set { key: StoreKey, value: Vec<u8> },
    Delete { key: StoreKey },
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum StoreError {
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("value too large: {size} bytes exceeds maximum of {max} bytes")]
    ValueTooLarge { size: usize, max: usize },

    #[error("storage error: {message}")]
    Storage { message: String },
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::new(ErrorKind::Storage, e.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum StoreOutput {
    Value(Option<Vec<u8>>),
    Written,
    Deleted { existed: bool },
}

impl StoreOutput {
    #[must_use]
    pub fn into_value(self) -> Option<Vec<u8>> {
        match self {
            Self::Value(value) => value,
            _ => None,
        }
    }
}

pub type StoreResult = Result<StoreOutput, StoreError>;

impl Operation for StoreOperation {
    type Output = StoreResult;
}

#[derive(Clone)]
pub struct Store<Ev> {
    context: CapabilityContext<StoreOperation, Ev>,
}

impl<Ev> Capability<Ev> for Store<Ev> {
    type Operation = StoreOperation;
    type MappedSelf<MappedEv> = Store<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static,
    {
        Store::new(self.context.map_event(f))
    }
}

impl<Ev> Store<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<StoreOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn get<F>(&self, key: StoreKey, make_event: F)
    where
        F: FnOnce(StoreResult) -> Ev + Send + 'static,
    {
        self.request(StoreOperation::Get { key }, make_event);
    }

    pub fn set<F>(&self, key: StoreKey, value: Vec<u8>, make_event: F)
    where
        F: FnOnce(StoreResult) -> Ev + Send + 'static,
    {
        if value.len() > MAX_VALUE_SIZE {
            let error = StoreError::ValueTooLarge {
                size: value.len(),
                max: MAX_VALUE_SIZE,
            };
            let context = self.context.clone();
            self.context.spawn(async move {
                context.update_app(make_event(Err(error)));
            });
            return;
        }

        self.request(StoreOperation::Set { key, value }, make_event);
    }

    pub fn delete<F>(&self, key: StoreKey, make_event: F)
    where
        F: FnOnce(StoreResult) -> Ev + Send + 'static,
    {
        self.request(StoreOperation::Delete { key }, make_event);
    }

    fn request<F>(&self, operation: StoreOperation, make_event: F)
    where
        F: FnOnce(StoreResult) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let response = context.request_from_shell(operation).await;
            context.update_app(make_event(response));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_validation_rejects_empty_and_whitespace() {
        assert!(StoreKey::new(StoreNamespace::Session, "").is_err());
        assert!(StoreKey::new(StoreNamespace::Session, "   ").is_err());
    }

    #[test]
    fn key_validation_rejects_control_characters() {
        assert!(StoreKey::new(StoreNamespace::Session, "key\0value").is_err());
        assert!(StoreKey::new(StoreNamespace::Session, "key\x01").is_err());
    }

    #[test]
    fn key_validation_rejects_oversized_keys() {
        let long_key = "a".repeat(MAX_KEY_LENGTH + 1);
        let result = StoreKey::new(StoreNamespace::Session, long_key);
        assert!(matches!(result, Err(StoreError::InvalidKey { .. })));
    }

    #[test]
    fn key_validation_accepts_reasonable_keys() {
        let key = StoreKey::new(StoreNamespace::Session, "trip-view_3").unwrap();
        assert_eq!(key.key(), "trip-view_3");
    }

    #[test]
    fn well_known_keys_carry_their_namespace() {
        assert_eq!(StoreKey::user_name().raw(), "identity:user_name");
        assert_eq!(StoreKey::last_trip().raw(), "session:last_trip_id");
        assert_eq!(StoreKey::edit_windows().raw(), "edit_windows:starts");
        assert_eq!(StoreKey::user_name().namespace(), StoreNamespace::Identity);
    }

    #[test]
    fn output_value_extraction() {
        let output = StoreOutput::Value(Some(vec![1, 2, 3]));
        assert_eq!(output.into_value(), Some(vec![1, 2, 3]));

        assert_eq!(StoreOutput::Written.into_value(), None);
        assert_eq!(StoreOutput::Value(None).into_value(), None);
    }

    #[test]
    fn operations_serialize_round_trip() {
        let op = StoreOperation::Set {
            key: StoreKey::edit_windows(),
            value: vec![123],
        };
        let json = serde_json::to_string(&op).unwrap();
        let back: StoreOperation = serde_json::from_str(&json).unwrap();
        assert_eq!(op, back);
    }

    #[test]
    fn store_error_converts_to_storage_app_error() {
        let app: AppError = StoreError::Storage {
            message: "quota".into(),
        }
        .into();
        assert_eq!(app.kind, ErrorKind::Storage);
        assert!(app.is_retryable());
    }
}
