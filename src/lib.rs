//! A radix-tree HTTP request router: maps `(method, path)` to a handler,
//! with named (`:name`) and catch-all (`*name`) dynamic segments, a
//! trailing-slash recommendation, and case-insensitive path repair.
//!
//! The core (`tree`, `registry`, `path`, `params`) has no knowledge of any
//! particular HTTP library; `service` wires a [`registry::Router`] into a
//! real `hyper` server.

pub mod config;
pub mod error;
pub mod params;
pub mod path;
pub mod registry;
pub mod service;
pub mod static_files;
pub mod tree;

pub use error::RouterError;
pub use params::Params;
pub use registry::{Dispatch, Router};
