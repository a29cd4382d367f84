//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the blob storage backing uploaded files.

pub mod storage;
