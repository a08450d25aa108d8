//! Registrar Books — thin client for the book-metadata lookup vendor.

pub mod client;
pub mod models;
