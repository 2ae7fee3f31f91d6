//! Library half of the veil CLI: the subcommand implementations and the
//! embedded sample program they operate on.

pub mod commands;
pub mod sample;
