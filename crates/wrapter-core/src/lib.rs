pub mod backend;
pub mod config;
pub mod error;
pub mod io;
pub mod paths;
pub mod region;
pub mod requirements;
pub mod resolver;
pub mod runner;
pub mod scaffold;
pub mod templates;
pub mod toolchain;
pub mod types;
pub mod walk;

pub use error::{Result, WrapterError};
