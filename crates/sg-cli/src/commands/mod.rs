//! CLI command implementations

pub(crate) mod common;
pub(crate) mod contracts;
pub(crate) mod geo;
pub(crate) mod ingest;
pub(crate) mod report;
pub(crate) mod stages;
pub(crate) mod validate;
