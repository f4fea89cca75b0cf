pub mod app;
pub mod state;

pub use app::{build_ingest_router, build_read_router};
pub use state::{IngestState, Pipeline, ReadState};
