//! Wizard core: flag normalization, question plans, answer collection and
//! command assembly. Terminal and process I/O enter only through the
//! `Prompter` and `ToolInvoker` seams.

pub mod answers;
pub mod assemble;
pub mod context;
pub mod defaults;
pub mod flags;
pub mod plan;
pub mod prompt;
pub mod search;
pub mod session;

pub use flags::{CommandDescriptor, RawCommand};
pub use prompt::TerminalPrompter;
pub use session::{Session, discover_commands};
