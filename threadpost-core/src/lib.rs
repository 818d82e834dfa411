//! Core of the threadpost "new thread" composer.
//!
//! - [`draft`]: the segment chain and its structural rules
//! - [`composer`]: permission-gated acquisition flows and submission
//! - [`capability`]: traits for the device collaborators
//! - [`db`]: the SQLite post store implementing [`sink::PostSink`]

pub mod capability;
pub mod composer;
pub mod db;
pub mod draft;
pub mod error;
pub mod schema;
pub mod sink;
pub mod types;
