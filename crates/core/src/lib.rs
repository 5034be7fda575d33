//! Domain logic for the redactedhook decision gateway.
//!
//! Everything in this crate is pure: request shapes, default resolution,
//! validation and the filter predicates that decide whether a release is
//! accepted. Network access lives in `redactedhook-indexer`.

pub mod error;
pub mod filters;
pub mod html;
pub mod records;
pub mod request;
pub mod resolver;
pub mod size;
pub mod types;
pub mod validation;
