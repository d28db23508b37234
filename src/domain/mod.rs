//! Domain entities shared by the persistence layer and the web service.

pub mod lead;
pub mod opportunity;
pub mod types;
