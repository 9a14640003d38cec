//! labsite - terminal client for a research lab's content API
//!
//! The library half holds everything that does not touch the terminal:
//!
//! - [`api`] - HTTP client, response envelopes and typed records
//! - [`resource`] - The seven resources and the collection fetcher
//! - [`context`] - Loads every collection once and publishes the result
//! - [`views`] - Derived views the pages render
//! - [`config`] - Persistent configuration

pub mod api;
pub mod config;
pub mod context;
pub mod resource;
pub mod views;
