// Library exports for Aralin
// This allows integration tests and external code to use Aralin modules

pub mod config;
pub mod error;
pub mod extractors;
pub mod gamification;
pub mod routes;
pub mod state;
pub mod store;
