//! Command implementations for the CLI
//!
//! - start: Start the pricing server
//! - test: Test configuration validity
//! - config: Configuration display and validation
//! - catalog: Build and print one provider catalog

pub mod catalog;
pub mod config;
pub mod start;
pub mod test;
