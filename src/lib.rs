//! dilemma library
//!
//! Core functionality for the dilemma poll bot: the round lifecycle engine
//! (registry, vote processing, countdown, result aggregation), the question
//! bank, message rendering, and the Telegram transport.

pub mod bot;
pub mod channels;
pub mod cli;
pub mod config;
pub mod logging;
pub mod messages;
pub mod questions;
pub mod rounds;
