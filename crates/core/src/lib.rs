//! Core types for the intake backend
//!
//! This crate provides the types shared across all other crates:
//! - Discovery funnel wire types (question steps and answered history)
//! - Project records and their status lifecycle
//! - Error types

pub mod discovery;
pub mod error;
pub mod project;

pub use discovery::{AnsweredStep, QuestionStep};
pub use error::{Error, Result};
pub use project::{NewProject, Project, ProjectPatch, ProjectStatus, Quote};
