//! assessor-loader — Sources of tests and question sets.
//!
//! Implements the `QuestionSetLoader` trait for a directory of TOML test
//! files, the HTTP testing backend, and an in-memory mock, plus the
//! configuration that selects between them.

pub mod config;
pub mod files;
pub mod http;
pub mod mock;

pub use config::{create_loader, load_config, AssessorConfig, SourceConfig};
pub use files::FileLoader;
pub use http::HttpLoader;
pub use mock::MockLoader;
