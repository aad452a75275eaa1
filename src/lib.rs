pub mod batch;
pub mod cli;
pub mod config;
pub mod diagram;
pub mod export;
pub mod format;
pub mod layout;
pub mod palette;
pub mod render;
pub mod resource;
pub mod table;
pub mod workbook;

pub use cli::run;
