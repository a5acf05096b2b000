//! State module for tracking frontier progress
//!
//! # Components
//!
//! - `FrontierStatus`: the lifecycle of a single address record
//!   (pending, claimed, done, failed)

mod status;

pub use status::FrontierStatus;
