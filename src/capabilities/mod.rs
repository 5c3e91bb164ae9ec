pub mod backend;
pub mod store;

pub use self::backend::{
    Backend, BackendError, BackendOperation, BackendOutput, BackendResult, FilterExpr, SortExpr,
};
pub use self::store::{
    Store, StoreError, StoreKey, StoreNamespace, StoreOperation, StoreOutput, StoreResult,
};

// We use Crux's built-in Render capability directly because it provides
// all necessary functionality for triggering view updates.
pub use crux_core::render::Render;

use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
#[effect(app = "App")]
pub struct Capabilities {
    pub backend: Backend<Event>,
    pub store: Store<Event>,
    pub render: Render<Event>,
}
