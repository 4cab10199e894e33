//! Configuration module for mdclip
//!
//! This module handles user preferences for the copy pipeline,
//! including serialization/deserialization to/from JSON and
//! persistent storage to platform-specific directories.

mod persistence;
mod settings;

pub use persistence::*;
pub use settings::*;
