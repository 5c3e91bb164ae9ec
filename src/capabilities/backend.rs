use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::records::Collection;
use crate::{AppError, ErrorKind};

// The hosted record service. The shell owns the actual SDK client; the
// core only speaks this operation protocol. Filtering is deliberately
// limited to single-field equality and single-field sort, which is all
// the service's query mini-language is used for here.

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterExpr(String);

impl FilterExpr {
    #[must_use]
    pub fn field_eq(field: &str, value: &str) -> Self {
        Self(format!("{field} = \"{}\"", escape_value(value)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn escape_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortExpr(String);

impl SortExpr {
    #[must_use]
    pub fn ascending(field: &str) -> Self {
        Self(field.to_string())
    }

    #[must_use]
    pub fn descending(field: &str) -> Self {
        Self(format!("-{field}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "data")]
pub enum BackendOperation {
    List {
        collection: Collection,
        filter: Option<FilterExpr>,
        sort: Option<SortExpr>,
    },
    Get {
        collection: Collection,
        id: String,
    },
    Create {
        collection: Collection,
        fields: Value,
    },
    Update {
        collection: Collection,
        id: String,
        fields: Value,
    },
    Delete {
        collection: Collection,
        id: String,
    },
    Subscribe {
        collection: Collection,
        filter: Option<FilterExpr>,
    },
    Unsubscribe {
        collection: Option<Collection>,
    },
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum BackendError {
    #[error("network error: {message}")]
    Network {
        message: String,
        #[serde(default)]
        is_retryable: bool,
    },

    #[error("request timed out")]
    Timeout,

    #[error("server returned status {code}: {message}")]
    Status { code: u16, message: String },

    #[error("record not found: {id}")]
    NotFound { id: String },

    #[error("could not decode service response: {message}")]
    Decode { message: String },

    #[error("unknown service error: {message}")]
    Unknown { message: String },
}

impl BackendError {
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Network { is_retryable, .. } => *is_retryable,
            Self::Timeout => true,
            Self::Status { code, .. } => *code >= 500 || *code == 429 || *code == 408,
            Self::NotFound { .. } | Self::Decode { .. } | Self::Unknown { .. } => false,
        }
    }

    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            is_retryable: true,
        }
    }
}

impl From<BackendError> for AppError {
    fn from(e: BackendError) -> Self {
        let kind = match &e {
            BackendError::Network { .. } => ErrorKind::Network,
            BackendError::Timeout => ErrorKind::Timeout,
            BackendError::Status { code, .. } => match code {
                404 => ErrorKind::NotFound,
                400 => ErrorKind::Validation,
                500..=599 => ErrorKind::Internal,
                _ => ErrorKind::Unknown,
            },
            BackendError::NotFound { .. } => ErrorKind::NotFound,
            BackendError::Decode { .. } => ErrorKind::Deserialization,
            BackendError::Unknown { .. } => ErrorKind::Unknown,
        };
        AppError::new(kind, e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum BackendOutput {
    Records(Vec<Value>),
    Record(Value),
    Deleted { existed: bool },
    Subscribed { collection: Collection },
    Unsubscribed,
}

impl BackendOutput {
    #[must_use]
    pub fn records(self) -> Option<Vec<Value>> {
        match self {
            Self::Records(records) => Some(records),
            _ => None,
        }
    }

    #[must_use]
    pub fn record(self) -> Option<Value> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }
}

pub type BackendResult = Result<BackendOutput, BackendError>;

impl Operation for BackendOperation {
    type Output = BackendResult;
}

#[derive(Clone)]
pub struct Backend<Ev> {
    context: CapabilityContext<BackendOperation, Ev>,
}

impl<Ev> Capability<Ev> for Backend<Ev> {
    type Operation = BackendOperation;
    type MappedSelf<MappedEv> = Backend<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static,
    {
        Backend::new(self.context.map_event(f))
    }
}

impl<Ev> Backend<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<BackendOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn list<F>(
        &self,
        collection: Collection,
        filter: Option<FilterExpr>,
        sort: Option<SortExpr>,
        make_event: F,
    ) where
        F: FnOnce(BackendResult) -> Ev + Send + 'static,
    {
        self.request(
            BackendOperation::List {
                collection,
                filter,
                sort,
            },
            make_event,
        );
    }

    pub fn get<F>(&self, collection: Collection, id: impl Into<String>, make_event: F)
    where
        F: FnOnce(BackendResult) -> Ev + Send + 'static,
    {
        self.request(
            BackendOperation::Get {
                collection,
                id: id.into(),
            },
            make_event,
        );
    }

    pub fn create<F>(&self, collection: Collection, fields: Value, make_event: F)
    where
        F: FnOnce(BackendResult) -> Ev + Send + 'static,
    {
        self.request(BackendOperation::Create { collection, fields }, make_event);
    }

    pub fn update<F>(
        &self,
        collection: Collection,
        id: impl Into<String>,
        fields: Value,
        make_event: F,
    ) where
        F: FnOnce(BackendResult) -> Ev + Send + 'static,
    {
        self.request(
            BackendOperation::Update {
                collection,
                id: id.into(),
                fields,
            },
            make_event,
        );
    }

    pub fn delete<F>(&self, collection: Collection, id: impl Into<String>, make_event: F)
    where
        F: FnOnce(BackendResult) -> Ev + Send + 'static,
    {
        self.request(
            BackendOperation::Delete {
                collection,
                id: id.into(),
            },
            make_event,
        );
    }

    pub fn subscribe<F>(&self, collection: Collection, filter: Option<FilterExpr>, make_event: F)
    where
        F: FnOnce(BackendResult) -> Ev + Send + 'static,
    {
        self.request(
            BackendOperation::Subscribe { collection, filter },
            make_event,
        );
    }

    pub fn unsubscribe<F>(&self, collection: Option<Collection>, make_event: F)
    where
        F: FnOnce(BackendResult) -> Ev + Send + 'static,
    {
        self.request(BackendOperation::Unsubscribe { collection }, make_event);
    }

    fn request<F>(&self, operation: BackendOperation, make_event: F)
    where
        F: FnOnce(BackendResult) -> Ev + Send + 'static,
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
    fn filter_quotes_the_value() {
        let filter = FilterExpr::field_eq("status", "open");
        assert_eq!(filter.as_str(), "status = \"open\"");
    }

    #[test]
    fn filter_escapes_quotes_and_backslashes() {
        let filter = FilterExpr::field_eq("name", "Pic\"nic");
        assert_eq!(filter.as_str(), "name = \"Pic\\\"nic\"");

        let filter = FilterExpr::field_eq("name", "back\\slash");
        assert_eq!(filter.as_str(), "name = \"back\\\\slash\"");
    }

    #[test]
    fn sort_expressions() {
        assert_eq!(SortExpr::descending("created").as_str(), "-created");
        assert_eq!(SortExpr::ascending("created").as_str(), "created");
    }

    #[test]
    fn operations_serialize_round_trip() {
        let op = BackendOperation::List {
            collection: Collection::Trips,
            filter: Some(FilterExpr::field_eq("status", "open")),
            sort: Some(SortExpr::descending("created")),
        };
        let json = serde_json::to_string(&op).unwrap();
        let back: BackendOperation = serde_json::from_str(&json).unwrap();
        assert_eq!(op, back);

        let op = BackendOperation::Unsubscribe { collection: None };
        let json = serde_json::to_string(&op).unwrap();
        let back: BackendOperation = serde_json::from_str(&json).unwrap();
        assert_eq!(op, back);
    }

    #[test]
    fn error_retryability() {
        assert!(BackendError::network("offline").is_retryable());
        assert!(BackendError::Timeout.is_retryable());
        assert!(BackendError::Status {
            code: 503,
            message: "unavailable".into()
        }
        .is_retryable());
        assert!(BackendError::Status {
            code: 429,
            message: "slow down".into()
        }
        .is_retryable());
        assert!(!BackendError::Status {
            code: 400,
            message: "bad".into()
        }
        .is_retryable());
        assert!(!BackendError::NotFound { id: "x".into() }.is_retryable());
        assert!(!BackendError::Decode {
            message: "bad json".into()
        }
        .is_retryable());
    }

    #[test]
    fn errors_map_to_app_error_kinds() {
        let app: AppError = BackendError::network("offline").into();
        assert_eq!(app.kind, ErrorKind::Network);

        let app: AppError = BackendError::Status {
            code: 404,
            message: "missing".into(),
        }
        .into();
        assert_eq!(app.kind, ErrorKind::NotFound);

        let app: AppError = BackendError::Status {
            code: 500,
            message: "boom".into(),
        }
        .into();
        assert_eq!(app.kind, ErrorKind::Internal);

        let app: AppError = BackendError::Decode {
            message: "bad".into(),
        }
        .into();
        assert_eq!(app.kind, ErrorKind::Deserialization);
    }

    #[test]
    fn output_accessors() {
        let records = BackendOutput::Records(vec![serde_json::json!({"id": "t1"})]);
        assert_eq!(records.records().unwrap().len(), 1);

        let record = BackendOutput::Record(serde_json::json!({"id": "t1"}));
        assert!(record.record().is_some());

        assert!(BackendOutput::Unsubscribed.records().is_none());
    }

    #[test]
    fn error_serializes_round_trip() {
        let error = BackendError::Status {
            code: 502,
            message: "bad gateway".into(),
        };
        let json = serde_json::to_string(&error).unwrap();
        let back: BackendError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, back);
    }
}
