//! HTTP API for gpai-wa

pub mod health;
pub mod webhook;

pub use health::{health_check, health_routes};
pub use webhook::whatsapp_webhook;
