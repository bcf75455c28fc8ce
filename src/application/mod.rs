pub mod cli;
mod context;

pub use context::*;
