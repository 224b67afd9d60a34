pub mod args;
pub mod books;
pub mod cli;
pub mod config;
pub mod db;
pub mod export;
pub mod posting;
pub mod records;
pub mod terminal;
