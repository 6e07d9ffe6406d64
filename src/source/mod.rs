//! Resolves command-line inputs into an ordered list of markdown documents.

pub mod loader;

pub use loader::{DocumentLoader, LoadFailure, LoadedDocuments, STDIN_INPUT};
