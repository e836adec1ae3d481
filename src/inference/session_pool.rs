//! Session pool utilities for concurrent model inference.
//!
//! Provides [`SessionPool`] for managing multiple model instances that can
//! serve inference requests concurrently. Uses ort's [`PrepackedWeights`] to
//! share model weights across pooled sessions, reducing memory overhead.

use std::path::Path;

use ort::session::builder::PrepackedWeights;
use ort::session::Session;
use parking_lot::{Mutex, MutexGuard};

use crate::inference::InferenceError;

/// Acquires a lock from the pool using try_lock round-robin,
/// falling back to blocking on slot 0 if all are contended.
fn acquire<T>(pool: &[Mutex<T>]) -> MutexGuard<'_, T> {
    for m in pool.iter() {
        if let Some(guard) = m.try_lock() {
            return guard;
        }
    }
    pool[0].lock()
}

/// A pool of N identical model instances sharing [`PrepackedWeights`].
///
/// Each instance is behind its own [`Mutex`], allowing up to N concurrent
/// inference calls. The pool distributes access via try_lock round-robin.
pub struct SessionPool<T> {
    instances: Vec<Mutex<T>>,
}

impl<T> SessionPool<T> {
    /// Creates a pool of `pool_size` instances (at least one), sharing a
    /// single [`PrepackedWeights`] across all sessions.
    pub fn new<F>(pool_size: usize, init: F) -> Result<Self, InferenceError>
    where
        F: Fn(&PrepackedWeights) -> Result<T, InferenceError>,
    {
        let weights = PrepackedWeights::new();
        let pool_size = pool_size.max(1);
        let mut instances = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            instances.push(Mutex::new(init(&weights)?));
        }
        Ok(Self { instances })
    }

    /// Executes a closure with exclusive access to one pooled instance.
    pub fn with<F, R>(&self, f: F) -> Result<R, InferenceError>
    where
        F: FnOnce(&mut T) -> Result<R, InferenceError>,
    {
        let mut guard = acquire(&self.instances);
        f(&mut guard)
    }
}

/// Builds an ONNX Runtime session for `model_path`.
///
/// A missing file is reported as [`InferenceError::ModelUnavailable`] so
/// callers can tell it apart from a corrupt model.
pub fn load_session(
    model_path: &Path,
    prepacked: &PrepackedWeights,
    num_threads: usize,
) -> Result<Session, InferenceError> {
    if !model_path.is_file() {
        return Err(InferenceError::ModelUnavailable {
            path: model_path.to_path_buf(),
        });
    }

    let session = Session::builder()
        .map_err(|source| InferenceError::ModelFileLoadError {
            path: model_path.to_path_buf(),
            source,
        })?
        .with_execution_providers([
            ort::execution_providers::CUDAExecutionProvider::default()
                .with_device_id(0)
                .build(),
        ])?
        .with_intra_threads(num_threads)?
        .with_prepacked_weights(prepacked)?
        .commit_from_file(model_path)
        .map_err(|source| InferenceError::ModelFileLoadError {
            path: model_path.to_path_buf(),
            source,
        })?;

    Ok(session)
}

/// Name of the session's first input, for models exported with arbitrary
/// tensor names.
pub fn first_input_name(session: &Session) -> Result<String, InferenceError> {
    session
        .inputs
        .first()
        .map(|input| input.name.clone())
        .ok_or_else(|| InferenceError::PredictionError {
            operation: "inspect model inputs".to_string(),
            message: "model declares no inputs".to_string(),
        })
}

/// Name of the session's first output.
pub fn first_output_name(session: &Session) -> Result<String, InferenceError> {
    session
        .outputs
        .first()
        .map(|output| output.name.clone())
        .ok_or_else(|| InferenceError::PredictionError {
            operation: "inspect model outputs".to_string(),
            message: "model declares no outputs".to_string(),
        })
}
