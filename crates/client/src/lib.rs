//! REST client for the remote image generation service.
//!
//! Wraps the imagine / fetch / button / account-info endpoints, and
//! provides a cancellable completion poller for command-line use.

pub mod api;
pub mod events;
pub mod poller;
