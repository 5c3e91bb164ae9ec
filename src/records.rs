use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;

use crate::{AppError, ErrorKind};

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

typed_id!(TripId);
typed_id!(OrderId);
typed_id!(ItemId);

// --- Explicit timestamp unit ---

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnixTimeMs(pub u64);

impl UnixTimeMs {
    #[must_use]
    pub fn now() -> Self {
        Self(crate::get_current_time_ms())
    }

    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn elapsed_since(self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    #[must_use]
    pub fn add_millis(self, ms: u64) -> Self {
        Self(self.0.saturating_add(ms))
    }
}

// --- Record collections served by the backend ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Trips,
    Orders,
    Items,
}

impl Collection {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Trips => "trips",
            Self::Orders => "orders",
            Self::Items => "items",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// --- Domain enums replacing stringly-typed fields ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    #[default]
    Open,
    Closed,
}

impl TripStatus {
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "open" | "active" => Some(Self::Open),
            "closed" | "done" | "finished" => Some(Self::Closed),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Closed => "Closed",
        }
    }

    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    // A trip closes once; there is no way back.
    pub const fn validate_close(self) -> Result<(), TransitionError> {
        match self {
            Self::Open => Ok(()),
            Self::Closed => Err(TransitionError::AlreadyClosed),
        }
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Trip is already closed")]
    AlreadyClosed,
}

impl From<TransitionError> for AppError {
    fn from(e: TransitionError) -> Self {
        AppError::new(ErrorKind::Validation, e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FoundStatus {
    #[default]
    Pending,
    Found,
    Unavailable,
    Substituted,
}

impl FoundStatus {
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "pending" => Some(Self::Pending),
            "found" => Some(Self::Found),
            "unavailable" | "out_of_stock" | "missing" => Some(Self::Unavailable),
            "substituted" | "substitute" | "swapped" => Some(Self::Substituted),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Found => "found",
            Self::Unavailable => "unavailable",
            Self::Substituted => "substituted",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Found => "Found",
            Self::Unavailable => "Unavailable",
            Self::Substituted => "Substituted",
        }
    }

    #[must_use]
    pub const fn is_settled(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for FoundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// --- Records ---
// Wire shape matches the backend's record fields; the shell adapter
// normalizes `created`/`updated` to epoch milliseconds before handing
// records to the core.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: TripStatus,
    #[serde(default)]
    pub created_by: String,
    #[serde(rename = "created")]
    pub created_at_ms_utc: UnixTimeMs,
    #[serde(rename = "updated")]
    pub updated_at_ms_utc: UnixTimeMs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub trip_id: TripId,
    pub user_name: String,
    #[serde(rename = "created")]
    pub created_at_ms_utc: UnixTimeMs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub order_id: OrderId,
    pub name: String,
    pub quantity: f64,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub found_status: FoundStatus,
    #[serde(default)]
    pub price: f64,
    #[serde(rename = "created")]
    pub created_at_ms_utc: UnixTimeMs,
}

impl Item {
    #[must_use]
    pub fn has_price(&self) -> bool {
        self.price > 0.0
    }
}

// --- Drafts: validated before any write is attempted ---

#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("Trip name is required")]
    TripNameRequired,
    #[error("User name is required")]
    UserNameRequired,
    #[error("Trip ID is required")]
    TripIdRequired,
    #[error("Item name is required")]
    ItemNameRequired,
    #[error("Quantity must be a positive number")]
    QuantityNotPositive,
    #[error("Price must be a non-negative number")]
    PriceNegative,
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::new(ErrorKind::Validation, e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TripDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl TripDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::TripNameRequired);
        }
        Ok(())
    }

    #[must_use]
    pub fn to_fields(&self) -> Value {
        json!({
            "name": self.name.trim(),
            "description": self.description.trim(),
            "status": TripStatus::Open.as_str(),
            "created_by": "admin",
        })
    }

    // Edit form payload: name and description only, never status.
    #[must_use]
    pub fn to_edit_fields(&self) -> Value {
        json!({
            "name": self.name.trim(),
            "description": self.description.trim(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub trip_id: TripId,
    pub user_name: String,
}

impl OrderDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.user_name.trim().is_empty() {
            return Err(ValidationError::UserNameRequired);
        }
        if self.trip_id.as_str().is_empty() {
            return Err(ValidationError::TripIdRequired);
        }
        Ok(())
    }

    #[must_use]
    pub fn to_fields(&self) -> Value {
        json!({
            "trip_id": self.trip_id.as_str(),
            "user_name": self.user_name.trim(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ItemDraft {
    pub name: String,
    pub quantity: f64,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub price: Option<f64>,
}

impl ItemDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::ItemNameRequired);
        }
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(ValidationError::QuantityNotPositive);
        }
        if let Some(price) = self.price {
            if !price.is_finite() || price < 0.0 {
                return Err(ValidationError::PriceNegative);
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn fields_for(&self, order_id: &OrderId) -> Value {
        json!({
            "order_id": order_id.as_str(),
            "name": self.name.trim(),
            "quantity": self.quantity,
            "brand": self.brand.trim(),
            "notes": self.notes.trim(),
            "found_status": FoundStatus::Pending.as_str(),
            "price": self.price.unwrap_or(0.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_draft(name: &str, quantity: f64) -> ItemDraft {
        ItemDraft {
            name: name.into(),
            quantity,
            ..ItemDraft::default()
        }
    }

    #[test]
    fn typed_ids_display_inner_value() {
        assert_eq!(TripId::new("t1").to_string(), "t1");
        assert_eq!(OrderId::new("o1").as_str(), "o1");
    }

    #[test]
    fn trip_status_round_trips_as_snake_case() {
        let json = serde_json::to_string(&TripStatus::Open).unwrap();
        assert_eq!(json, "\"open\"");
        let back: TripStatus = serde_json::from_str("\"closed\"").unwrap();
        assert_eq!(back, TripStatus::Closed);
    }

    #[test]
    fn trip_status_parses_leniently() {
        assert_eq!(TripStatus::from_str(" Open "), Some(TripStatus::Open));
        assert_eq!(TripStatus::from_str("FINISHED"), Some(TripStatus::Closed));
        assert_eq!(TripStatus::from_str("bogus"), None);
    }

    #[test]
    fn closing_an_open_trip_is_valid_once() {
        assert!(TripStatus::Open.validate_close().is_ok());
        assert_eq!(
            TripStatus::Closed.validate_close(),
            Err(TransitionError::AlreadyClosed)
        );
    }

    #[test]
    fn found_status_parses_synonyms() {
        assert_eq!(FoundStatus::from_str("out-of-stock"), Some(FoundStatus::Unavailable));
        assert_eq!(FoundStatus::from_str("substitute"), Some(FoundStatus::Substituted));
        assert_eq!(FoundStatus::from_str("found"), Some(FoundStatus::Found));
        assert_eq!(FoundStatus::from_str("???"), None);
    }

    #[test]
    fn found_status_settled() {
        assert!(!FoundStatus::Pending.is_settled());
        assert!(FoundStatus::Found.is_settled());
        assert!(FoundStatus::Unavailable.is_settled());
    }

    #[test]
    fn trip_parses_backend_record() {
        let trip: Trip = serde_json::from_value(json!({
            "id": "t1",
            "name": "Picnic",
            "status": "open",
            "created": 1000,
            "updated": 2000,
        }))
        .unwrap();

        assert_eq!(trip.id, TripId::new("t1"));
        assert_eq!(trip.description, "");
        assert_eq!(trip.created_by, "");
        assert_eq!(trip.created_at_ms_utc, UnixTimeMs(1000));
        assert!(trip.status.is_open());
    }

    #[test]
    fn item_parses_with_defaults() {
        let item: Item = serde_json::from_value(json!({
            "id": "i1",
            "order_id": "o1",
            "name": "Milk",
            "quantity": 2.0,
            "created": 500,
        }))
        .unwrap();

        assert_eq!(item.found_status, FoundStatus::Pending);
        assert_eq!(item.price, 0.0);
        assert!(!item.has_price());
        assert!(item.brand.is_empty());
    }

    #[test]
    fn trip_draft_requires_name() {
        let draft = TripDraft {
            name: "   ".into(),
            description: String::new(),
        };
        assert_eq!(draft.validate(), Err(ValidationError::TripNameRequired));
        assert_eq!(
            ValidationError::TripNameRequired.to_string(),
            "Trip name is required"
        );
    }

    #[test]
    fn trip_draft_fields_force_open_status() {
        let draft = TripDraft {
            name: " Picnic ".into(),
            description: "park run".into(),
        };
        let fields = draft.to_fields();
        assert_eq!(fields["name"], "Picnic");
        assert_eq!(fields["status"], "open");
        assert_eq!(fields["created_by"], "admin");

        let edit = draft.to_edit_fields();
        assert!(edit.get("status").is_none());
    }

    #[test]
    fn order_draft_validation_messages() {
        let draft = OrderDraft {
            trip_id: TripId::new("t1"),
            user_name: "  ".into(),
        };
        assert_eq!(
            draft.validate().unwrap_err().to_string(),
            "User name is required"
        );

        let draft = OrderDraft {
            trip_id: TripId::new(""),
            user_name: "Sam".into(),
        };
        assert_eq!(
            draft.validate().unwrap_err().to_string(),
            "Trip ID is required"
        );
    }

    #[test]
    fn item_draft_rejects_bad_quantity() {
        assert_eq!(
            item_draft("Milk", -1.0).validate(),
            Err(ValidationError::QuantityNotPositive)
        );
        assert_eq!(
            item_draft("Milk", 0.0).validate(),
            Err(ValidationError::QuantityNotPositive)
        );
        assert_eq!(
            item_draft("Milk", f64::NAN).validate(),
            Err(ValidationError::QuantityNotPositive)
        );
        assert!(item_draft("Milk", 0.5).validate().is_ok());
    }

    #[test]
    fn item_draft_rejects_negative_price() {
        let mut draft = item_draft("Milk", 1.0);
        draft.price = Some(-0.5);
        assert_eq!(draft.validate(), Err(ValidationError::PriceNegative));
        assert_eq!(
            ValidationError::PriceNegative.to_string(),
            "Price must be a non-negative number"
        );

        draft.price = Some(0.0);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn item_draft_requires_name() {
        assert_eq!(
            item_draft("", 1.0).validate().unwrap_err().to_string(),
            "Item name is required"
        );
    }

    #[test]
    fn item_fields_default_to_pending_and_zero_price() {
        let fields = item_draft(" Milk ", 2.0).fields_for(&OrderId::new("o9"));
        assert_eq!(fields["order_id"], "o9");
        assert_eq!(fields["name"], "Milk");
        assert_eq!(fields["found_status"], "pending");
        assert_eq!(fields["price"], 0.0);
    }

    #[test]
    fn validation_error_converts_to_app_error() {
        let app_error: AppError = ValidationError::QuantityNotPositive.into();
        assert_eq!(app_error.kind, ErrorKind::Validation);
        assert_eq!(app_error.message, "Quantity must be a positive number");
    }

    #[test]
    fn unix_time_saturates() {
        let earlier = UnixTimeMs(1000);
        let later = UnixTimeMs(2500);
        assert_eq!(later.elapsed_since(earlier), 1500);
        assert_eq!(earlier.elapsed_since(later), 0);
        assert_eq!(UnixTimeMs(u64::MAX).add_millis(10), UnixTimeMs(u64::MAX));
    }

    #[test]
    fn collection_names() {
        assert_eq!(Collection::Trips.name(), "trips");
        assert_eq!(Collection::Orders.to_string(), "orders");
        assert_eq!(Collection::Items.name(), "items");
    }
}
