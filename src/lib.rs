pub mod api;
pub mod catalog;
pub mod config;
pub mod db;
pub mod filter;
pub mod logo;
pub mod model;
pub mod paging;
pub mod telemetry;
