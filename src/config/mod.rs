mod settings;

pub use settings::{IngestServerConfig, PipelineConfig, ReadServerConfig, Settings};
