pub mod api;
pub mod compliance;
pub mod db;
pub mod error;
pub mod ledger;
pub mod server;
pub mod workflow;
