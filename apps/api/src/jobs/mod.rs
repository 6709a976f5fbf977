//! Job postings: store, form validation, HTTP handlers.

pub mod handlers;
pub mod store;

pub use store::JobStore;
