//! Command handlers for the vagent CLI.

pub mod chat;
pub mod config;
pub mod model;
pub mod output;
pub mod run;
pub mod session;
pub mod shell;

pub use chat::*;
pub use config::*;
pub use model::*;
pub use run::*;
pub use session::SessionArgs;
pub use shell::*;
