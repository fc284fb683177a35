//! Axum handlers, grouped by route family.

pub mod health_handlers;
pub mod launch_handlers;
