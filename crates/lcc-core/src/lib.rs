pub mod config;
pub mod error;
pub mod io;
pub mod message;
pub mod paths;
pub mod responder;
pub mod workflow;

pub use error::{LccError, Result};
pub use message::{Conversation, Message, Role};
pub use responder::{respond, Responder};
pub use workflow::{apply_choice, start_run, RunState, Step, Workflow};
