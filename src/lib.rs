//! Stagecard Library
//!
//! This library provides the core of the Stagecard workflow designer: stage
//! card tool layouts, balloon catalogs and their editors, the stage edit
//! workspace, and the terminal, command-line and HTTP surfaces built on them.

// Module declarations
pub mod cli;
pub mod config;
pub mod constants;
pub mod designer;
pub mod editor;
pub mod models;
pub mod services;
pub mod shortcuts;
pub mod tui;
#[cfg(feature = "web")]
pub mod web;
