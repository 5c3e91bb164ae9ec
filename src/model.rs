use serde::{Deserialize, Serialize};

use crate::capabilities::{FilterExpr, SortExpr};
use crate::edit_window::EditWindows;
use crate::records::{Item, ItemDraft, Order, Trip, TripId};
use crate::sync::SubscriptionSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    #[default]
    Welcome,
    Trips,
    TripDetail,
    Profile,
    ManageTrips,
    Shopping,
    History,
}

impl Page {
    // Which collection a page is looking at decides whether a push
    // notification for that collection triggers a refetch.
    #[must_use]
    pub const fn shows_trips(self) -> bool {
        matches!(
            self,
            Self::Trips | Self::ManageTrips | Self::History | Self::Shopping
        )
    }

    #[must_use]
    pub const fn shows_orders(self) -> bool {
        matches!(self, Self::TripDetail | Self::Shopping)
    }

    #[must_use]
    pub const fn trip_scope(self) -> Option<TripScope> {
        match self {
            Self::Trips | Self::Shopping => Some(TripScope::Open),
            Self::ManageTrips => Some(TripScope::All),
            Self::History => Some(TripScope::Closed),
            Self::Welcome | Self::TripDetail | Self::Profile => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TripScope {
    #[default]
    Open,
    Closed,
    All,
}

impl TripScope {
    #[must_use]
    pub fn filter(self) -> Option<FilterExpr> {
        match self {
            Self::Open => Some(FilterExpr::field_eq("status", "open")),
            Self::Closed => Some(FilterExpr::field_eq("status", "closed")),
            Self::All => None,
        }
    }

    // Closed trips read best by recency of their last change; everything
    // else by creation time.
    #[must_use]
    pub fn sort(self) -> SortExpr {
        match self {
            Self::Open | Self::All => SortExpr::descending("created"),
            Self::Closed => SortExpr::descending("updated"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastTone {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub message: String,
    pub tone: ToastTone,
}

impl Toast {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            tone: ToastTone::Success,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            tone: ToastTone::Error,
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            tone: ToastTone::Info,
        }
    }
}

#[derive(Default)]
pub struct Model {
    pub page: Page,
    pub is_admin: bool,
    pub user_name: Option<String>,

    pub trips: Vec<Trip>,
    pub trip_scope: TripScope,
    pub current_trip: Option<Trip>,
    pub orders: Vec<Order>,
    pub items: Vec<Item>,

    pub edit_windows: EditWindows,
    pub subscriptions: SubscriptionSet,
    pub last_trip_id: Option<TripId>,

    // Item drafts held between order creation and the item create fan-out.
    pub pending_items: Vec<ItemDraft>,
    pub pending_item_creates: usize,
    pub pending_item_failed: bool,

    pub is_refreshing: bool,
    pub active_toast: Option<Toast>,
}

impl Model {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toast_success(&mut self, message: impl Into<String>) {
        self.active_toast = Some(Toast::success(message));
    }

    pub fn toast_error(&mut self, message: impl Into<String>) {
        self.active_toast = Some(Toast::error(message));
    }

    pub fn toast_info(&mut self, message: impl Into<String>) {
        self.active_toast = Some(Toast::info(message));
    }

    pub fn clear_toast(&mut self) {
        self.active_toast = None;
    }

    #[must_use]
    pub fn current_trip_id(&self) -> Option<&TripId> {
        self.current_trip.as_ref().map(|trip| &trip.id)
    }

    #[must_use]
    pub fn can_add_order(&self) -> bool {
        self.current_trip
            .as_ref()
            .is_some_and(|trip| trip.status.is_open())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{TripStatus, UnixTimeMs};

    fn trip(status: TripStatus) -> Trip {
        Trip {
            id: TripId::new("t1"),
            name: "Picnic".into(),
            description: String::new(),
            status,
            created_by: "admin".into(),
            created_at_ms_utc: UnixTimeMs(1),
            updated_at_ms_utc: UnixTimeMs(1),
        }
    }

    #[test]
    fn pages_watching_trips() {
        assert!(Page::Trips.shows_trips());
        assert!(Page::ManageTrips.shows_trips());
        assert!(Page::History.shows_trips());
        assert!(Page::Shopping.shows_trips());
        assert!(!Page::TripDetail.shows_trips());
        assert!(!Page::Profile.shows_trips());
    }

    #[test]
    fn pages_watching_orders() {
        assert!(Page::TripDetail.shows_orders());
        assert!(Page::Shopping.shows_orders());
        assert!(!Page::Trips.shows_orders());
    }

    #[test]
    fn page_scopes() {
        assert_eq!(Page::Trips.trip_scope(), Some(TripScope::Open));
        assert_eq!(Page::ManageTrips.trip_scope(), Some(TripScope::All));
        assert_eq!(Page::History.trip_scope(), Some(TripScope::Closed));
        assert_eq!(Page::Profile.trip_scope(), None);
    }

    #[test]
    fn scope_queries() {
        assert_eq!(
            TripScope::Open.filter().unwrap().as_str(),
            "status = \"open\""
        );
        assert!(TripScope::All.filter().is_none());
        assert_eq!(TripScope::Closed.sort().as_str(), "-updated");
        assert_eq!(TripScope::Open.sort().as_str(), "-created");
    }

    #[test]
    fn add_order_only_on_open_trips() {
        let mut model = Model::new();
        assert!(!model.can_add_order());

        model.current_trip = Some(trip(TripStatus::Open));
        assert!(model.can_add_order());

        model.current_trip = Some(trip(TripStatus::Closed));
        assert!(!model.can_add_order());
    }

    #[test]
    fn toast_helpers_set_tone() {
        let mut model = Model::new();
        model.toast_error("nope");
        assert_eq!(model.active_toast.as_ref().unwrap().tone, ToastTone::Error);

        model.toast_success("yay");
        assert_eq!(
            model.active_toast.as_ref().unwrap().tone,
            ToastTone::Success
        );

        model.clear_toast();
        assert!(model.active_toast.is_none());
    }
}
