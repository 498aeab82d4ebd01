//! JALU Library
//!
//! Core functionality for estimating meal nutrition from detected food objects.

pub mod build_info;
pub mod config;
pub mod detection;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod tools;
