//! Registrar Evals — thin client for the course-evaluation vendor.

pub mod client;
pub mod models;
