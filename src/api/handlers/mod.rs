pub mod articles;
pub mod core;
pub mod not_found;
pub mod search;
pub mod stats;
pub mod update;
