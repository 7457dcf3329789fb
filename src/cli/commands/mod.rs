pub mod completion;
pub mod inputs;
