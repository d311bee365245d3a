#![forbid(unsafe_code)]

pub mod assign;
pub mod report;
pub mod select;
pub mod state;
pub mod story;
