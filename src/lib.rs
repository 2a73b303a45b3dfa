//! Parser for Windows resource scripts and a checker for translations missing
//! between the language files of a component.

pub mod commands;
pub mod config;
pub mod model;
pub mod rc;
pub mod scan;
