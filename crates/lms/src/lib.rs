//! Registrar LMS — v1 API client and SIS CSV import orchestration.

pub mod api;
pub mod client;
pub mod import;
pub mod models;
pub mod status;
