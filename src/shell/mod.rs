//! Shell module for the terminal front end

mod protocol;
mod terminal;

pub use terminal::Terminal;
