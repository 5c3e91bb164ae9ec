use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::capabilities::{Capabilities, FilterExpr, SortExpr, StoreKey, StoreResult};
use crate::capabilities::{BackendOutput, BackendResult};
use crate::edit_window::{format_remaining, EditWindows};
use crate::event::Event;
use crate::model::{Model, Page, Toast, TripScope};
use crate::records::{
    Collection, Item, Order, OrderDraft, OrderId, Trip, TripId, TripStatus, ValidationError,
};
use crate::sync;
use crate::{
    format_currency, format_time_ago, get_current_time_ms, initials, sanitize_text, AppError,
    ErrorKind, EDIT_WARNING_SECS,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripCard {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status_label: String,
    pub is_open: bool,
    pub created_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripHeader {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status_label: String,
    pub is_open: bool,
    pub can_add_order: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemLine {
    pub item_id: String,
    pub name: String,
    pub quantity_label: String,
    pub brand: Option<String>,
    pub notes: Option<String>,
    pub status_label: String,
    pub is_settled: bool,
    pub price_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCard {
    pub order_id: String,
    pub user_name: String,
    pub initials: String,
    pub time_ago: String,
    pub can_edit: bool,
    pub countdown: Option<String>,
    pub countdown_warning: bool,
    pub items: Vec<ItemLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingGroup {
    pub user_name: String,
    pub initials: String,
    pub items: Vec<ItemLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    pub page: Page,
    pub is_admin: bool,
    pub needs_name: bool,
    pub user_name: String,
    pub user_initials: String,
    pub toast: Option<Toast>,
    pub is_refreshing: bool,
    pub trips: Vec<TripCard>,
    pub current_trip: Option<TripHeader>,
    pub orders: Vec<OrderCard>,
    pub shopping_groups: Vec<ShoppingGroup>,
    pub last_trip_id: Option<String>,
}

#[derive(Default)]
pub struct App;

impl App {
    fn request_trips(model: &mut Model, caps: &Capabilities, scope: TripScope) {
        model.is_refreshing = true;
        caps.backend.list(
            Collection::Trips,
            scope.filter(),
            Some(scope.sort()),
            move |result| Event::TripsLoaded {
                scope,
                result: Box::new(result),
            },
        );
    }

    fn request_orders(caps: &Capabilities, trip_id: TripId) {
        let filter = FilterExpr::field_eq("trip_id", trip_id.as_str());
        caps.backend.list(
            Collection::Orders,
            Some(filter),
            Some(SortExpr::descending("created")),
            move |result| Event::OrdersLoaded {
                trip_id,
                result: Box::new(result),
            },
        );
    }

    fn request_items(caps: &Capabilities, order_id: OrderId) {
        let filter = FilterExpr::field_eq("order_id", order_id.as_str());
        caps.backend.list(
            Collection::Items,
            Some(filter),
            Some(SortExpr::ascending("created")),
            move |result| Event::ItemsLoaded {
                order_id,
                result: Box::new(result),
            },
        );
    }

    fn subscribe_orders(model: &mut Model, caps: &Capabilities, trip_id: &TripId) {
        let filter = FilterExpr::field_eq("trip_id", trip_id.as_str());
        let replaced = model
            .subscriptions
            .subscribe(Collection::Orders, Some(filter.as_str().to_string()));
        if replaced {
            debug!(trip = %trip_id, "replacing orders subscription");
        }
        caps.backend.subscribe(Collection::Orders, Some(filter), |result| {
            Event::SubscriptionChanged(Box::new(result))
        });
    }

    fn persist_edit_windows(model: &Model, caps: &Capabilities) {
        match serde_json::to_vec(&model.edit_windows) {
            Ok(bytes) => caps.store.set(StoreKey::edit_windows(), bytes, |result| {
                Event::StoreWritten(Box::new(result))
            }),
            Err(error) => warn!(error = %error, "could not serialize edit windows"),
        }
    }

    fn reload_for_page(model: &mut Model, caps: &Capabilities) {
        if let Some(scope) = model.page.trip_scope() {
            Self::request_trips(model, caps, scope);
        }
        if model.page.shows_orders() {
            if let Some(trip_id) = model.current_trip_id().cloned() {
                Self::request_orders(caps, trip_id);
            }
        }
    }

    // Push-driven refetch policy: re-pull the whole collection, and only
    // when the current page is actually showing it.
    fn handle_change(model: &mut Model, caps: &Capabilities, collection: Collection) {
        match collection {
            Collection::Trips => {
                if let Some(scope) = model.page.trip_scope() {
                    Self::request_trips(model, caps, scope);
                }
            }
            Collection::Orders | Collection::Items => {
                if model.page.shows_orders() {
                    if let Some(trip_id) = model.current_trip_id().cloned() {
                        Self::request_orders(caps, trip_id);
                    }
                }
            }
        }
    }

    fn finish_order_creation(model: &mut Model, caps: &Capabilities) {
        if model.pending_item_failed {
            model.toast_error("Failed to create order");
        } else {
            model.toast_success("Order created successfully!");
        }
        model.pending_item_failed = false;

        if let Some(trip_id) = model.current_trip_id().cloned() {
            Self::request_orders(caps, trip_id);
        }
    }

    fn store_value(result: StoreResult, key: &str) -> Option<Vec<u8>> {
        match result {
            Ok(output) => output.into_value(),
            Err(error) => {
                warn!(key, error = %error, "local store read failed");
                None
            }
        }
    }

    fn records_from(result: BackendResult) -> Result<Vec<Value>, AppError> {
        match result {
            Ok(output) => output
                .records()
                .ok_or_else(|| AppError::new(ErrorKind::InvalidState, "unexpected service output")),
            Err(error) => Err(error.into()),
        }
    }

    fn record_from(result: BackendResult) -> Result<Value, AppError> {
        match result {
            Ok(output) => output
                .record()
                .ok_or_else(|| AppError::new(ErrorKind::InvalidState, "unexpected service output")),
            Err(error) => Err(error.into()),
        }
    }

    fn parse_record<T: DeserializeOwned>(value: Value) -> Result<T, AppError> {
        serde_json::from_value(value).map_err(|e| {
            AppError::new(ErrorKind::Deserialization, "Malformed record from backend")
                .with_internal(e.to_string())
        })
    }

    fn report_failure(model: &mut Model, error: &AppError, notice: &str) {
        warn!(
            code = error.code(),
            retryable = error.is_retryable(),
            "{notice}: {error}"
        );
        model.toast_error(notice);
    }

    fn build_trip_cards(model: &Model, now_ms: u64) -> Vec<TripCard> {
        model
            .trips
            .iter()
            .map(|trip| TripCard {
                id: trip.id.as_str().into(),
                name: sanitize_text(&trip.name),
                description: if trip.description.trim().is_empty() {
                    "No description".into()
                } else {
                    sanitize_text(&trip.description)
                },
                status_label: trip.status.display_name().into(),
                is_open: trip.status.is_open(),
                created_label: format_time_ago(trip.created_at_ms_utc.as_millis(), now_ms),
            })
            .collect()
    }

    fn build_trip_header(model: &Model) -> Option<TripHeader> {
        model.current_trip.as_ref().map(|trip| TripHeader {
            id: trip.id.as_str().into(),
            name: sanitize_text(&trip.name),
            description: if trip.description.trim().is_empty() {
                "No description".into()
            } else {
                sanitize_text(&trip.description)
            },
            status_label: trip.status.display_name().into(),
            is_open: trip.status.is_open(),
            can_add_order: model.can_add_order(),
        })
    }

    fn build_item_line(item: &Item) -> ItemLine {
        ItemLine {
            item_id: item.id.as_str().into(),
            name: sanitize_text(&item.name),
            quantity_label: item.quantity.to_string(),
            brand: (!item.brand.trim().is_empty()).then(|| sanitize_text(&item.brand)),
            notes: (!item.notes.trim().is_empty()).then(|| sanitize_text(&item.notes)),
            status_label: item.found_status.display_name().into(),
            is_settled: item.found_status.is_settled(),
            price_label: item.has_price().then(|| format_currency(item.price)),
        }
    }

    fn build_order_cards(model: &Model, now_ms: u64) -> Vec<OrderCard> {
        model
            .orders
            .iter()
            .map(|order| {
                let editable = model.edit_windows.is_editable(&order.id, now_ms);
                let remaining = model.edit_windows.remaining_seconds(&order.id, now_ms);

                OrderCard {
                    order_id: order.id.as_str().into(),
                    user_name: sanitize_text(&order.user_name),
                    initials: initials(&order.user_name),
                    time_ago: format_time_ago(order.created_at_ms_utc.as_millis(), now_ms),
                    can_edit: editable || model.is_admin,
                    countdown: editable.then(|| format_remaining(remaining)),
                    countdown_warning: editable && remaining < EDIT_WARNING_SECS,
                    items: model
                        .items
                        .iter()
                        .filter(|item| item.order_id == order.id)
                        .map(Self::build_item_line)
                        .collect(),
                }
            })
            .collect()
    }

    fn build_shopping_groups(model: &Model) -> Vec<ShoppingGroup> {
        sync::group_items_by_user(&model.items, &model.orders)
            .into_iter()
            .map(|(user_name, items)| ShoppingGroup {
                initials: initials(&user_name),
                items: items.iter().map(Self::build_item_line).collect(),
                user_name: sanitize_text(&user_name),
            })
            .collect()
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        debug!(event = event.name(), "handling event");

        match event {
            Event::Started { admin } => {
                model.is_admin = admin;

                caps.store.get(StoreKey::user_name(), |result| {
                    Event::IdentityLoaded(Box::new(result))
                });
                caps.store.get(StoreKey::edit_windows(), |result| {
                    Event::EditWindowsLoaded(Box::new(result))
                });
                caps.store.get(StoreKey::last_trip(), |result| {
                    Event::LastTripLoaded(Box::new(result))
                });

                model.subscriptions.subscribe(Collection::Trips, None);
                caps.backend.subscribe(Collection::Trips, None, |result| {
                    Event::SubscriptionChanged(Box::new(result))
                });

                if admin {
                    model.page = Page::ManageTrips;
                    Self::request_trips(model, caps, TripScope::All);
                } else {
                    model.page = Page::Welcome;
                    Self::request_trips(model, caps, TripScope::Open);
                }

                caps.render.render();
            }

            Event::Stopped => {
                let torn_down = model.subscriptions.unsubscribe(None);
                debug!(count = torn_down.len(), "tearing down subscriptions");
                caps.backend.unsubscribe(None, |result| {
                    Event::SubscriptionChanged(Box::new(result))
                });
            }

            Event::IdentityLoaded(result) => {
                if let Some(bytes) = Self::store_value(*result, "user_name") {
                    match String::from_utf8(bytes) {
                        Ok(name) if !name.trim().is_empty() => {
                            model.user_name = Some(name);
                            if model.page == Page::Welcome {
                                model.page = Page::Trips;
                            }
                        }
                        Ok(_) => {}
                        Err(error) => warn!(error = %error, "stored user name is not UTF-8"),
                    }
                }
                caps.render.render();
            }

            Event::EditWindowsLoaded(result) => {
                if let Some(bytes) = Self::store_value(*result, "edit_windows") {
                    match serde_json::from_slice::<EditWindows>(&bytes) {
                        Ok(mut windows) => {
                            windows.prune_expired(get_current_time_ms());
                            model.edit_windows = windows;
                        }
                        // A corrupt snapshot silently revokes edit rights,
                        // which is acceptable for an advisory window.
                        Err(error) => warn!(error = %error, "discarding bad edit windows"),
                    }
                }
                caps.render.render();
            }

            Event::LastTripLoaded(result) => {
                if let Some(bytes) = Self::store_value(*result, "last_trip_id") {
                    if let Ok(id) = String::from_utf8(bytes) {
                        if !id.trim().is_empty() {
                            model.last_trip_id = Some(TripId::new(id));
                        }
                    }
                }
            }

            Event::StoreWritten(result) => {
                if let Err(error) = *result {
                    let error = AppError::from(error);
                    warn!(code = error.code(), "local store write failed: {error}");
                }
            }

            Event::NameEntered { name } => {
                let name = sanitize_text(name.trim());
                if name.trim().is_empty() {
                    model.toast_error("Please enter a valid name");
                } else {
                    caps.store.set(
                        StoreKey::user_name(),
                        name.clone().into_bytes(),
                        |result| Event::StoreWritten(Box::new(result)),
                    );
                    model.toast_success(format!("Welcome, {name}!"));
                    model.user_name = Some(name);
                    model.page = Page::Trips;
                    Self::request_trips(model, caps, TripScope::Open);
                }
                caps.render.render();
            }

            Event::ProfileSaveRequested { name } => {
                let name = sanitize_text(name.trim());
                if name.trim().is_empty() {
                    model.toast_error("Please enter a valid name");
                } else {
                    caps.store.set(
                        StoreKey::user_name(),
                        name.clone().into_bytes(),
                        |result| Event::StoreWritten(Box::new(result)),
                    );
                    model.user_name = Some(name);
                    model.toast_success("Profile updated successfully!");
                }
                caps.render.render();
            }

            Event::LogoutRequested => {
                model.user_name = None;
                model.page = Page::Welcome;
                caps.store.delete(StoreKey::user_name(), |result| {
                    Event::StoreWritten(Box::new(result))
                });
                model.toast_info("Logged out successfully");
                caps.render.render();
            }

            Event::PageRequested(page) => {
                model.page = page;
                Self::reload_for_page(model, caps);
                caps.render.render();
            }

            Event::RefreshRequested => {
                Self::reload_for_page(model, caps);
                caps.render.render();
            }

            Event::TimerTicked => {
                // Countdown labels are recomputed in view().
                caps.render.render();
            }

            Event::ToastDismissed => {
                model.clear_toast();
                caps.render.render();
            }

            Event::TripsLoaded { scope, result } => {
                model.is_refreshing = false;

                match Self::records_from(*result).and_then(sync::parse_records::<Trip>) {
                    Ok(mut trips) => {
                        match scope {
                            TripScope::Closed => sync::sort_trips_recently_updated_first(&mut trips),
                            TripScope::Open | TripScope::All => {
                                sync::sort_trips_newest_first(&mut trips);
                            }
                        }
                        debug!(count = trips.len(), ?scope, "trips loaded");
                        model.trip_scope = scope;
                        model.trips = trips;
                    }
                    Err(error) => {
                        let notice = if scope == TripScope::Closed {
                            "Failed to load trip history"
                        } else {
                            "Failed to load trips"
                        };
                        Self::report_failure(model, &error, notice);
                    }
                }
                caps.render.render();
            }

            Event::TripOpened { trip_id } => {
                caps.backend.get(Collection::Trips, trip_id.as_str(), |result| {
                    Event::TripLoaded(Box::new(result))
                });
            }

            Event::TripLoaded(result) => {
                match Self::record_from(*result).and_then(Self::parse_record::<Trip>) {
                    Ok(trip) => {
                        model.page = Page::TripDetail;
                        model.last_trip_id = Some(trip.id.clone());
                        caps.store.set(
                            StoreKey::last_trip(),
                            trip.id.as_str().as_bytes().to_vec(),
                            |result| Event::StoreWritten(Box::new(result)),
                        );
                        Self::subscribe_orders(model, caps, &trip.id);
                        Self::request_orders(caps, trip.id.clone());
                        model.current_trip = Some(trip);
                    }
                    Err(error) => {
                        Self::report_failure(model, &error, "Failed to load trip details");
                    }
                }
                caps.render.render();
            }

            Event::OrdersLoaded { trip_id, result } => {
                match Self::records_from(*result).and_then(sync::parse_records::<Order>) {
                    Ok(mut orders) => {
                        sync::sort_orders_newest_first(&mut orders);
                        debug!(trip = %trip_id, count = orders.len(), "orders loaded");
                        for order in &orders {
                            Self::request_items(caps, order.id.clone());
                        }
                        // Last response wins; stale item partitions are
                        // replaced as their reloads arrive.
                        model.orders = orders;
                    }
                    Err(error) => {
                        let notice = if model.page == Page::Shopping {
                            "Failed to load shopping list"
                        } else {
                            "Failed to load orders"
                        };
                        Self::report_failure(model, &error, notice);
                    }
                }
                caps.render.render();
            }

            Event::ItemsLoaded { order_id, result } => {
                match Self::records_from(*result).and_then(sync::parse_records::<Item>) {
                    Ok(mut fresh) => {
                        sync::sort_items_oldest_first(&mut fresh);
                        sync::upsert_order_items(&mut model.items, &order_id, fresh);
                        caps.render.render();
                    }
                    // No user-facing notice for a single order's items;
                    // the next orders refresh retries the partition.
                    Err(error) => {
                        warn!(order = %order_id, code = error.code(), "items load failed: {error}");
                    }
                }
            }

            Event::OrderSubmitted { user_name, items } => {
                let draft = OrderDraft {
                    trip_id: model
                        .current_trip_id()
                        .cloned()
                        .unwrap_or_else(|| TripId::new("")),
                    user_name: user_name
                        .or_else(|| model.user_name.clone())
                        .unwrap_or_default(),
                };

                if items.is_empty() {
                    model.toast_error("Please add at least one item");
                    caps.render.render();
                    return;
                }
                if let Err(error) = draft.validate() {
                    model.toast_error(error.to_string());
                    caps.render.render();
                    return;
                }
                if let Some(error) = items.iter().find_map(|item| item.validate().err()) {
                    model.toast_error(error.to_string());
                    caps.render.render();
                    return;
                }

                model.pending_items = items;
                model.pending_item_failed = false;
                caps.backend
                    .create(Collection::Orders, draft.to_fields(), |result| {
                        Event::OrderCreated(Box::new(result))
                    });
            }

            Event::OrderCreated(result) => {
                match Self::record_from(*result).and_then(Self::parse_record::<Order>) {
                    Ok(order) => {
                        // The creator gets a five-minute window, started
                        // exactly once, here.
                        model
                            .edit_windows
                            .start(order.id.clone(), get_current_time_ms());
                        Self::persist_edit_windows(model, caps);

                        let drafts = std::mem::take(&mut model.pending_items);
                        model.pending_item_creates = drafts.len();

                        if drafts.is_empty() {
                            Self::finish_order_creation(model, caps);
                        } else {
                            for draft in drafts {
                                caps.backend.create(
                                    Collection::Items,
                                    draft.fields_for(&order.id),
                                    |result| Event::ItemCreated(Box::new(result)),
                                );
                            }
                        }
                    }
                    Err(error) => {
                        model.pending_items.clear();
                        Self::report_failure(model, &error, "Failed to create order");
                    }
                }
                caps.render.render();
            }

            Event::ItemCreated(result) => {
                if let Err(error) = *result {
                    let error = AppError::from(error);
                    warn!(code = error.code(), "item create failed: {error}");
                    model.pending_item_failed = true;
                }

                if model.pending_item_creates > 0 {
                    model.pending_item_creates -= 1;
                    if model.pending_item_creates == 0 {
                        Self::finish_order_creation(model, caps);
                    }
                }
                caps.render.render();
            }

            Event::TripCreateSubmitted { draft } => {
                if let Err(error) = draft.validate() {
                    model.toast_error(error.to_string());
                    caps.render.render();
                    return;
                }
                caps.backend
                    .create(Collection::Trips, draft.to_fields(), |result| {
                        Event::TripCreated(Box::new(result))
                    });
            }

            Event::TripCreated(result) => {
                match *result {
                    Ok(_) => {
                        model.toast_success("Trip created successfully!");
                        let scope = model.page.trip_scope().unwrap_or(model.trip_scope);
                        Self::request_trips(model, caps, scope);
                    }
                    Err(error) => {
                        Self::report_failure(model, &error.into(), "Failed to create trip");
                    }
                }
                caps.render.render();
            }

            Event::TripEditSubmitted { trip_id, draft } => {
                if let Err(error) = draft.validate() {
                    model.toast_error(error.to_string());
                    caps.render.render();
                    return;
                }
                caps.backend.update(
                    Collection::Trips,
                    trip_id.as_str(),
                    draft.to_edit_fields(),
                    |result| Event::TripEdited(Box::new(result)),
                );
            }

            Event::TripEdited(result) => {
                match *result {
                    Ok(_) => {
                        model.toast_success("Trip updated successfully!");
                        let scope = model.page.trip_scope().unwrap_or(model.trip_scope);
                        Self::request_trips(model, caps, scope);
                    }
                    Err(error) => {
                        Self::report_failure(model, &error.into(), "Failed to update trip");
                    }
                }
                caps.render.render();
            }

            Event::TripCloseRequested { trip_id } => {
                if let Some(trip) = model.trips.iter().find(|trip| trip.id == trip_id) {
                    if let Err(error) = trip.status.validate_close() {
                        model.toast_error(error.to_string());
                        caps.render.render();
                        return;
                    }
                }
                caps.backend.update(
                    Collection::Trips,
                    trip_id.as_str(),
                    json!({ "status": TripStatus::Closed.as_str() }),
                    |result| Event::TripClosed(Box::new(result)),
                );
            }

            Event::TripClosed(result) => {
                match *result {
                    Ok(_) => {
                        model.toast_success("Trip closed successfully!");
                        let scope = model.page.trip_scope().unwrap_or(model.trip_scope);
                        Self::request_trips(model, caps, scope);
                    }
                    Err(error) => {
                        Self::report_failure(model, &error.into(), "Failed to close trip");
                    }
                }
                caps.render.render();
            }

            Event::TripDeleteRequested { trip_id } => {
                caps.backend
                    .delete(Collection::Trips, trip_id.as_str(), |result| {
                        Event::TripDeleted(Box::new(result))
                    });
            }

            Event::TripDeleted(result) => {
                match *result {
                    Ok(_) => {
                        model.toast_success("Trip deleted successfully!");
                        let scope = model.page.trip_scope().unwrap_or(model.trip_scope);
                        Self::request_trips(model, caps, scope);
                    }
                    Err(error) => {
                        Self::report_failure(model, &error.into(), "Failed to delete trip");
                    }
                }
                caps.render.render();
            }

            Event::ShoppingTripSelected { trip_id } => match trip_id {
                Some(id) => {
                    caps.backend.get(Collection::Trips, id.as_str(), |result| {
                        Event::ShoppingTripLoaded(Box::new(result))
                    });
                }
                None => {
                    model.current_trip = None;
                    model.orders.clear();
                    model.items.clear();
                    caps.render.render();
                }
            },

            Event::ShoppingTripLoaded(result) => {
                match Self::record_from(*result).and_then(Self::parse_record::<Trip>) {
                    Ok(trip) => {
                        Self::subscribe_orders(model, caps, &trip.id);
                        Self::request_orders(caps, trip.id.clone());
                        model.current_trip = Some(trip);
                    }
                    Err(error) => {
                        Self::report_failure(model, &error, "Failed to load shopping list");
                    }
                }
                caps.render.render();
            }

            Event::ItemStatusSubmitted {
                item_id,
                status,
                price,
            } => {
                if let Some(price) = price {
                    if !price.is_finite() || price < 0.0 {
                        model.toast_error(ValidationError::PriceNegative.to_string());
                        caps.render.render();
                        return;
                    }
                }

                let mut fields = json!({ "found_status": status.as_str() });
                if let Some(price) = price {
                    fields["price"] = json!(price);
                }
                caps.backend
                    .update(Collection::Items, item_id.as_str(), fields, |result| {
                        Event::ItemWriteCompleted(Box::new(result))
                    });
            }

            Event::ItemWriteCompleted(result) => {
                match *result {
                    Ok(_) => {
                        model.toast_success("Item status updated successfully!");
                        if let Some(trip_id) = model.current_trip_id().cloned() {
                            Self::request_orders(caps, trip_id);
                        }
                    }
                    Err(error) => {
                        Self::report_failure(model, &error.into(), "Failed to update item status");
                    }
                }
                caps.render.render();
            }

            Event::SubscriptionChanged(result) => match *result {
                Ok(BackendOutput::Subscribed { collection }) => {
                    debug!(%collection, "subscription active");
                }
                Ok(BackendOutput::Unsubscribed) => {
                    debug!("subscriptions torn down");
                }
                Ok(_) => {}
                Err(error) => {
                    warn!(error = %error, "subscription request failed");
                }
            },

            Event::ChangePushed {
                collection,
                action,
                record_id,
            } => {
                debug!(%collection, ?action, record = %record_id, "change notification");
                Self::handle_change(model, caps, collection);
            }
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        let now_ms = get_current_time_ms();

        ViewModel {
            page: model.page,
            is_admin: model.is_admin,
            needs_name: !model.is_admin && model.user_name.is_none(),
            user_name: model.user_name.clone().unwrap_or_default(),
            user_initials: initials(model.user_name.as_deref().unwrap_or_default()),
            toast: model.active_toast.clone(),
            is_refreshing: model.is_refreshing,
            trips: Self::build_trip_cards(model, now_ms),
            current_trip: Self::build_trip_header(model),
            orders: Self::build_order_cards(model, now_ms),
            shopping_groups: Self::build_shopping_groups(model),
            last_trip_id: model
                .last_trip_id
                .as_ref()
                .map(|id| id.as_str().to_string()),
        }
    }
}
