pub mod artifact_store;
pub mod document_builder;
pub mod download_sink;

pub use artifact_store::{ArtifactStore, CapturedArtifact};
pub use document_builder::DocumentBuilder;
pub use download_sink::DownloadSink;
