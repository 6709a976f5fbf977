//! Résumé records: store, intake validation, HTTP handlers.

pub mod handlers;
pub mod intake;
pub mod store;

pub use store::ResumeStore;
