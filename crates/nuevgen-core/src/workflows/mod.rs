//! # Workflows Module
//!
//! The top-level entry points of nuevgen.
//!
//! ## Overview
//!
//! A workflow owns the engine components for the duration of a generation run and exposes
//! them through a small lifecycle: set everything up once, draw interactions one at a time,
//! ask after every draw whether the spill is over, and write the run summary at the end.
//!
//! - **Event Generation** ([`generate`]) - The [`generate::EventGenerator`] with its
//!   `initialize` / `sample` / `stop` / `finish` lifecycle.

pub mod generate;
