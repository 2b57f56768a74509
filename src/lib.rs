// Library exports so integration tests can drive the router and stores
// without going through the binary.

pub mod auth;
pub mod comments;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod likes;
pub mod routes;
pub mod state;
