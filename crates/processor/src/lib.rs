// Domain-driven module structure for the log processor.

// Core pipeline
pub mod parser;
pub mod ingest;

// Process lifecycle
pub mod runtime;
pub mod conf;

// Collaborator boundaries
pub mod upload;
