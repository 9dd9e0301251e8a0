//! Shared API types for the Aegis services

pub mod types;
