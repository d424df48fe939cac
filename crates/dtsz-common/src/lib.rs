//! Common types and utilities for the dtsz declaration bundler.
//!
//! This crate provides foundational types used across all dtsz crates:
//! - Diagnostics (`Diagnostic`, `DiagnosticCategory`, codes and message templates)
//! - Line/column positions for diagnostics
//! - Centralized limits and thresholds

// Diagnostics shared by the parser, binder, bundler and CLI reporter
pub mod diagnostics;
pub use diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticRelatedInformation, diagnostic_codes, format_message,
};

// Centralized limits and thresholds
pub mod limits;

// Line/column positions for diagnostics
pub mod position;
pub use position::{LineMap, Position};
