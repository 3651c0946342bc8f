//! Three-panel terminal command console.
//!
//! The console consists of a single-line command entry panel with
//! readline-style history, a general output panel, and a third panel that is
//! either an error output panel or a command history panel. Entered command
//! strings are delivered to the application over a channel; the application
//! writes text back into the panels through control messages. An optional
//! relay forwards entered commands to a single connected peer as
//! newline-delimited JSON and routes peer output into the panels.

pub mod commands;
pub mod events;
pub mod history;
pub mod relay;
pub mod tui;
