//! Studio Router Library
//!
//! Models a studio of MIDI, USB, audio and CV instruments wired around a
//! hub sequencer, analyses the wiring for feedback loops and hub routes,
//! and exports per-route instrument definition files.

pub mod analysis;
pub mod config;
pub mod export;
pub mod graph;
pub mod persistence;
