pub mod codex;
pub mod completion;
pub mod instruction;
pub mod pr;
