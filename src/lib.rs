//! Huddle signaling and chat server library.
//!
//! This library implements an ephemeral-room call server: rooms with a
//! bounded-capacity participant roster, a process-wide connection hub that
//! fans out chat and signaling frames per room, and a REST surface for room
//! lifecycle management.

// layers
pub mod domain;
pub mod hub;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// shared library
pub mod common;
