use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AntError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Path error: {0}")]
    PathError(String),
    #[error("Invalid location {0:?}, expected [filepath:row]")]
    MalformedLocation(String),
    #[error("Annotation text must not contain newlines: {0:?}")]
    InvalidAnnotation(String),
    #[error("{} not found, has ant been initialized?", .0.display())]
    StoreNotInitialized(PathBuf),
    #[error("Annotation store has version {stored}, this ant is {current}")]
    IncompatibleVersion { stored: String, current: String },
    #[error("Path to source {} does not exist", .0.display())]
    SourceNotFound(PathBuf),
    #[error("Cannot annotate a directory: {}", .0.display())]
    InvalidTarget(PathBuf),
    #[error("Line {row} does not exist in {}", .path.display())]
    LineOutOfRange { row: u32, path: PathBuf },
    #[error("No annotations for file {}", .0.display())]
    NoAnnotations(PathBuf),
    #[error("Invalid line in annotations file, found {0:?}")]
    CorruptRecord(String),
}
