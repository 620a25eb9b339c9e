pub mod assistant;
pub mod chat;
pub mod config;
pub mod gemini;
pub mod i18n;
pub mod menu;
pub mod security;
pub mod server;
pub mod store;
