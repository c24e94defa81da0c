//! HTTP adapter for catalog browsing and recommendations.

pub mod dto;
mod handlers;
mod routes;

pub use routes::catalog_routes;
