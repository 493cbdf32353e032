pub mod args;
pub mod filename;
pub mod logging;
pub mod processor;
pub mod prompt;
pub mod scanner;
pub mod tagger;
pub mod tags;
pub mod tools;
