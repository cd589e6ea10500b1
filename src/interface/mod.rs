pub mod command;
pub mod config;
pub mod helper;
pub mod report;
