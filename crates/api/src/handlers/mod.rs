pub mod account;
pub mod archive;
pub mod generation;
