mod args;

pub use args::{parse, Cli};
