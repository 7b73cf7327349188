pub mod journey;
pub mod models;
pub mod notify;
pub mod persistence;
pub mod sqlite;
pub mod telemetry;
pub mod tracking;
