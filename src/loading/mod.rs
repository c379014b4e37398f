// UI loading indicator shared with dashboard clients

pub mod handlers;
pub mod reducer;
pub mod store;

pub use handlers::{dispatch_loading_handler, get_loading_handler};
pub use reducer::{reduce, DispatchedAction, LoadingAction, LoadingState, SET_LOADING};
pub use store::LoadingStore;
