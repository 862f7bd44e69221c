//! Persistence module
//!
//! Studio save/load using serde and JSON.

pub mod save_file;

pub use save_file::{
    load_from_file, parse_save_file, parse_save_file_with, save_to_file, MigrationDefaults,
    SaveFile, SaveFileError, SAVE_FILE_VERSION,
};
