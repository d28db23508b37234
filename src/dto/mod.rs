//! Data shapes passed between services and the HTTP layer.

pub mod api;
pub mod main;
