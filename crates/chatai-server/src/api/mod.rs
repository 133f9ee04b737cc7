//! HTTP API handlers

pub mod chat;
mod error;

pub use error::ApiError;
