//! Common types shared by the tilenav navigation mesh crates

mod geometry;

pub use geometry::*;

/// Represents a 3D position
pub type Vec3 = glam::Vec3;

/// Error types for the library
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The stream's leading format version does not match the supported one.
    #[error("unsupported navigation mesh format version {found} (expected {expected})")]
    VersionMismatch { expected: i32, found: i32 },

    /// The stream ended before a declared field or array element was read.
    #[error("unexpected end of data while reading navigation mesh")]
    UnexpectedEndOfData,

    /// A declared array or string length is negative or otherwise unusable.
    #[error("invalid {what} length {len} in navigation mesh data")]
    InvalidLength { what: &'static str, len: i64 },

    /// The build identifier string is not valid UTF-8.
    #[error("malformed build identifier: {0}")]
    InvalidString(#[from] std::string::FromUtf8Error),

    /// A tile with this identifier already exists in the mesh.
    #[error("tile id {0:#010x} is already present in the mesh")]
    DuplicateTileId(u32),

    /// Any other I/O failure on the underlying stream.
    #[error("I/O error: {0}")]
    Io(std::io::Error),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        // Exhausting the stream mid-record is its own error class; everything
        // else stays a plain I/O failure.
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::UnexpectedEndOfData
        } else {
            Error::Io(err)
        }
    }
}

/// Result type for tilenav operations
pub type Result<T> = std::result::Result<T, Error>;
