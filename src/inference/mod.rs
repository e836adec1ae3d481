pub mod classifier;
pub mod detector;
pub mod error;
pub mod orientation_net;
pub mod osd;
pub mod session_pool;

pub use classifier::YoloClassifier;
pub use detector::YoloDetector;
pub use error::InferenceError;
pub use orientation_net::OrientationNet;
pub use osd::TesseractOsd;
pub use session_pool::SessionPool;
