//! Question input for one-shot mode.

mod reader;

pub use reader::{MAX_INPUT_SIZE, read_question};
