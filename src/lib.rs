//! Draftmeta - Limited draft meta analysis over 17lands data
//!
//! Scores every card of a set, flags sleepers and traps against a draft
//! position model, ranks colors and two-color archetypes, reads format
//! speed and splash viability, and renders the result as text, JSON,
//! Markdown or an HTML draft guide.

pub mod ai;
pub mod analysis;
pub mod cache;
pub mod calibrate;
pub mod cli;
pub mod config;
pub mod data;
pub mod models;
pub mod pipeline;
pub mod reporters;
pub mod scoring;
pub mod stats;
