pub mod api;
pub mod config;
pub mod guard;
pub mod reconcile;
pub mod views;
