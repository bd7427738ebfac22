#![forbid(unsafe_code)]

pub mod citations;
pub mod cli;
pub mod config;
pub mod contributor_index;
pub mod document;
pub mod logging;
pub mod matcher;
pub mod migrate;
pub mod names;
pub mod registry;
pub mod state;
pub mod text;
pub mod tidy;
