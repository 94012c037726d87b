pub mod check;
pub mod common;
pub mod generate;
pub mod tables;
