//! Domain logic for the Nova image generation front-end.
//!
//! Everything in this crate is pure: response normalization, job-id
//! extraction, button codes, prompt validation and archive naming. The
//! HTTP client, filesystem archive and web surface live in sibling crates
//! and depend on these types.

pub mod button;
pub mod config;
pub mod error;
pub mod generation;
pub mod job;
pub mod naming;
pub mod normalize;
pub mod record;
