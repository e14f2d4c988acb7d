//! Command-line interface for Coursepath.
//!
//! Materializes course path caches from a directory of course outlines into
//! a redb database, inspects cached breadcrumbs, and manages configuration.
//!
//! # Key Abstractions
//!
//! - [`CoursepathCli<C>`](app::CoursepathCli): CLI application parameterized
//!   over a config provider
//! - [`CoursepathConfig`](config::CoursepathConfig): confyg-backed configuration

pub mod app;
pub mod cli;
pub mod config;
pub mod config_handlers;
pub mod course_handlers;

pub use app::CoursepathCli;
pub use cli::{CliArgs, Command, ConfigAction, ConfigCommand};
pub use config::CoursepathConfig;
