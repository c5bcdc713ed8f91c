//! Live departure board.
//!
//! A kiosk that answers: "what leaves from these platforms next?" It polls
//! National Rail Darwin for each configured station, pages through the
//! station's platforms, and hands each page to a renderer alongside the
//! clock and the outside temperature.

pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod darwin;
pub mod domain;
pub mod render;
pub mod schedule;
pub mod source;
pub mod weather;
