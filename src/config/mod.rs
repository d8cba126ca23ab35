//! Configuration module for rendered crawling
//!
//! This module provides the `CrawlConfig` struct and its builder for
//! configuring crawl and stream invocations with validation and sensible
//! defaults, plus the environment-driven `ServerConfig` used by the binary.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod server;
pub mod types;

// Re-exports for public API
pub use builder::CrawlConfigBuilder;
pub use server::ServerConfig;
pub use types::CrawlConfig;
