pub mod document;
pub mod inference;
pub mod server;
pub mod utils;

pub use document::{
    BoundingBox, Document, DocumentClassification, DocumentError, DocumentResult, DocumentType,
    OrientationChain, RotationAngle, ScoredBox, SignaturePipeline,
};
pub use inference::InferenceError;
pub use server::{build_state, create_app, start_server, AppState};
pub use utils::config::AppConfig;
