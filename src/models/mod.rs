//! Core data models for the launch resource server.
//!
//! These types describe what a request addresses (tenant, resource name,
//! launcher image) and what the storage collaborators hand back (file and
//! artifact descriptors). None of them is serialized directly; handlers
//! build their own response bodies from them.

pub mod artifact;
pub mod file_info;
pub mod resource;
pub mod tenant;
