use serde::{Deserialize, Serialize};

use crate::capabilities::{BackendResult, StoreResult};
use crate::model::{Page, TripScope};
use crate::records::{Collection, FoundStatus, ItemDraft, ItemId, OrderId, TripDraft, TripId};

// Push notification payload: what changed, how, and which record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Create,
    Update,
    Delete,
}

// Capability results are boxed to keep the enum small.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // Lifecycle & hydration
    Started {
        admin: bool,
    },
    Stopped,
    IdentityLoaded(Box<StoreResult>),
    EditWindowsLoaded(Box<StoreResult>),
    LastTripLoaded(Box<StoreResult>),
    StoreWritten(Box<StoreResult>),

    // Identity & profile
    NameEntered {
        name: String,
    },
    ProfileSaveRequested {
        name: String,
    },
    LogoutRequested,

    // Navigation & chrome
    PageRequested(Page),
    RefreshRequested,
    TimerTicked,
    ToastDismissed,

    // Trips
    TripsLoaded {
        scope: TripScope,
        result: Box<BackendResult>,
    },
    TripOpened {
        trip_id: TripId,
    },
    TripLoaded(Box<BackendResult>),

    // Orders & items
    OrdersLoaded {
        trip_id: TripId,
        result: Box<BackendResult>,
    },
    ItemsLoaded {
        order_id: OrderId,
        result: Box<BackendResult>,
    },
    OrderSubmitted {
        user_name: Option<String>,
        items: Vec<ItemDraft>,
    },
    OrderCreated(Box<BackendResult>),
    ItemCreated(Box<BackendResult>),

    // Admin: trip management
    TripCreateSubmitted {
        draft: TripDraft,
    },
    TripCreated(Box<BackendResult>),
    TripEditSubmitted {
        trip_id: TripId,
        draft: TripDraft,
    },
    TripEdited(Box<BackendResult>),
    TripCloseRequested {
        trip_id: TripId,
    },
    TripClosed(Box<BackendResult>),
    TripDeleteRequested {
        trip_id: TripId,
    },
    TripDeleted(Box<BackendResult>),

    // Admin: shopping mode
    ShoppingTripSelected {
        trip_id: Option<TripId>,
    },
    ShoppingTripLoaded(Box<BackendResult>),
    ItemStatusSubmitted {
        item_id: ItemId,
        status: FoundStatus,
        price: Option<f64>,
    },
    ItemWriteCompleted(Box<BackendResult>),

    // Live updates
    SubscriptionChanged(Box<BackendResult>),
    ChangePushed {
        collection: Collection,
        action: ChangeAction,
        record_id: String,
    },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Started { .. } => "started",
            Self::Stopped => "stopped",
            Self::IdentityLoaded(_) => "identity_loaded",
            Self::EditWindowsLoaded(_) => "edit_windows_loaded",
            Self::LastTripLoaded(_) => "last_trip_loaded",
            Self::StoreWritten(_) => "store_written",
            Self::NameEntered { .. } => "name_entered",
            Self::ProfileSaveRequested { .. } => "profile_save_requested",
            Self::LogoutRequested => "logout_requested",
            Self::PageRequested(_) => "page_requested",
            Self::RefreshRequested => "refresh_requested",
            Self::TimerTicked => "timer_ticked",
            Self::ToastDismissed => "toast_dismissed",
            Self::TripsLoaded { .. } => "trips_loaded",
            Self::TripOpened { .. } => "trip_opened",
            Self::TripLoaded(_) => "trip_loaded",
            Self::OrdersLoaded { .. } => "orders_loaded",
            Self::ItemsLoaded { .. } => "items_loaded",
            Self::OrderSubmitted { .. } => "order_submitted",
            Self::OrderCreated(_) => "order_created",
            Self::ItemCreated(_) => "item_created",
            Self::TripCreateSubmitted { .. } => "trip_create_submitted",
            Self::TripCreated(_) => "trip_created",
            Self::TripEditSubmitted { .. } => "trip_edit_submitted",
            Self::TripEdited(_) => "trip_edited",
            Self::TripCloseRequested { .. } => "trip_close_requested",
            Self::TripClosed(_) => "trip_closed",
            Self::TripDeleteRequested { .. } => "trip_delete_requested",
            Self::TripDeleted(_) => "trip_deleted",
            Self::ShoppingTripSelected { .. } => "shopping_trip_selected",
            Self::ShoppingTripLoaded(_) => "shopping_trip_loaded",
            Self::ItemStatusSubmitted { .. } => "item_status_submitted",
            Self::ItemWriteCompleted(_) => "item_write_completed",
            Self::SubscriptionChanged(_) => "subscription_changed",
            Self::ChangePushed { .. } => "change_pushed",
        }
    }
}
