//! Composition root
//!
//! [`init_app`] builds every component in dependency order and registers the
//! long-lived ones with the [`crate::infrastructure::Lifecycle`].

pub mod bootstrap;

pub use bootstrap::{AppContext, init_app, init_app_with_routes};
