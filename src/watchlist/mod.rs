pub mod controller;
pub mod store;

pub use controller::WatchlistController;
pub use store::{FileStore, PersistentList};
