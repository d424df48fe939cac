//! The `dtsz` command line: argument parsing, JSON config, the bundling
//! driver, diagnostic reporting and tracing setup.

pub mod args;
pub mod config;
pub mod driver;
pub mod reporter;
pub mod tracing_config;
