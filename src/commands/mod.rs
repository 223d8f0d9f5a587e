pub mod detect;
pub mod ingest;
pub mod trends;

// Re-export command functions for convenience
pub use detect::detect;
pub use ingest::ingest;
pub use trends::{sweep, trends};
