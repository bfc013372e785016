//! Filesystem access for the jungle layout.

pub mod config;
pub mod paths;
pub mod pointer;
pub mod releases;
