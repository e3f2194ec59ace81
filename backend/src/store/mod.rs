pub mod models;
pub mod review_store;

pub use review_store::{ReviewStore, StoreError, DEFAULT_CAPACITY};
