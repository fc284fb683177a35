//! Route table.

pub mod routes;
