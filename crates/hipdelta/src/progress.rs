//! Progress notifications.
//!
//! The pipeline reports what it is doing through a caller-supplied callback.
//! Each event's `Display` output is the exact line a front end should print;
//! scripts are known to scrape these lines.

use std::fmt;

/// A step of delta building, reported as it happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress<'a> {
    /// Both directories have been read.
    Loaded { original: u32, modified: u32 },
    /// Layer placement of new and changed assets begins.
    Selecting,
    /// A new or changed asset was placed in an output layer.
    Included { layer: usize, id: u32, name: &'a str },
    /// Placeholder creation for removed assets begins.
    Dummying,
    /// A removed asset was replaced by a placeholder.
    Dummied { id: u32, name: &'a str },
}

impl fmt::Display for Progress<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded { original, modified } => write!(
                f,
                "{original} asset(s) in original file, {modified} asset(s) in modified file"
            ),
            Self::Selecting => f.write_str("\nCreating new HIP with these assets:"),
            Self::Included { layer, id, name } => write!(f, "    Layer {layer}: [{id:08x}] {name}"),
            Self::Dummying => Ok(()),
            Self::Dummied { id, name } => write!(f, "Dummying asset [{id:08x}] {name}"),
        }
    }
}
