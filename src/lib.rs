pub mod fs;
pub mod shell;

pub use crate::fs::{
    config::FsConfig,
    error::{FileSystemError, Result},
    FileSystem, FsStats, Listing, ReadOutcome,
};
