//! Gantt data bridge for a Frappe/ERPNext host platform.
//!
//! This crate provides:
//! - A read endpoint that reshapes host Project/Task records into the
//!   Bryntum Gantt widget's task/dependency/resource/assignment schema
//! - Three permission-checked write-back endpoints (date drag, progress
//!   edit, dependency link) driven by user interaction in the widget
//! - A cached singleton settings record with validation and explicit
//!   cache invalidation on update
//! - A `HostStore` abstraction with a REST client implementation and an
//!   in-memory implementation for tests and local development

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Store-backed async methods can all fail

pub mod config;
pub mod error;
pub mod fetch;
pub mod gantt;
pub mod handlers;
pub mod models;
pub mod server;
pub mod settings;
pub mod store;
pub mod transform;

pub use config::Config;
pub use error::GanttError;
pub use gantt::GanttData;
pub use server::{build_router, AppState};
pub use settings::{GanttSettings, GanttSettingsRecord, SettingsProvider};
pub use store::{frappe::FrappeStore, memory::MemoryStore, HostStore};
