//! service-core: Shared infrastructure for the BukCare web front end.
pub mod error;
pub mod middleware;
pub mod observability;
