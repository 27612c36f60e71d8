pub mod archive;
pub mod button;
pub mod generate;
