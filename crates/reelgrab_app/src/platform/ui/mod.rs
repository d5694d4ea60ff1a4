pub mod prompt;
pub mod terminal;
