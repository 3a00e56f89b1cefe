#![warn(missing_docs)]
//! # offthread-core
//!
//! Core types for the offthread executor.
//!
//! This crate holds the pieces that do not depend on any particular async
//! runtime or instrumentation:
//!
//! - **What** runs on a worker ([`Computation`])
//! - **Where** it runs ([`Spawner`], [`ContextHandle`])
//! - **Whether** background execution is possible at all ([`Facility`])
//!
//! The executor itself, with its timing and bootstrap diagnostics, lives in
//! the `offthread` crate.

pub mod computation;
pub mod facility;
pub mod spawner;

pub use computation::{Computation, MissingInput, Shape};
pub use facility::{Facility, FacilityMode};
pub use spawner::{ContextHandle, Job, Spawner, ThreadSpawner};
