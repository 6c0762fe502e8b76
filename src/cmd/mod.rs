//! Command modules - one file per CLI command

pub mod execute;
pub mod print;
pub mod register;
