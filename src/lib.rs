//! Offline-first local cache for news resources tagged with topics and
//! authors: a SQLite-backed store with live (re-emitting) queries, and
//! repository facades that can run against a real backend abstraction or a
//! hardcoded fake data source.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod network;
pub mod repository;

pub use config::Config;
pub use db::{LocalStore, NewsResourceQuery};
pub use error::{AppError, Result};
