//! Orientation and script detection through the `tesseract` command line.
//!
//! Tesseract reports the clockwise rotation needed to make a page upright
//! (`Rotate:`) together with a confidence on a 0-100 scale. The reading is
//! converted to the counter-clockwise convention used by
//! [`RotationAngle`](crate::document::RotationAngle).

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use image::ImageFormat;
use tracing::debug;

use crate::document::orientation::{OrientationScanner, OsdReading};
use crate::document::Document;
use crate::inference::error::InferenceError;

pub struct TesseractOsd {
    binary: PathBuf,
    timeout: Duration,
}

impl TesseractOsd {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
    const POLL_INTERVAL: Duration = Duration::from_millis(20);

    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    fn program(&self) -> String {
        self.binary.display().to_string()
    }

    /// Runs `tesseract <image> stdout --psm 0` and returns its standard
    /// output. The child is killed once the timeout elapses.
    fn run(&self, image_path: &Path) -> Result<String, InferenceError> {
        let mut child = Command::new(&self.binary)
            .arg(image_path)
            .arg("stdout")
            .args(["--psm", "0"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| InferenceError::ProcessError {
                program: self.program(),
                source,
            })?;

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            let polled = child
                .try_wait()
                .map_err(|source| InferenceError::ProcessError {
                    program: self.program(),
                    source,
                })?;

            match polled {
                Some(status) => break status,
                None if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(InferenceError::Timeout {
                        operation: "orientation detection".to_string(),
                        timeout: self.timeout,
                    });
                }
                None => thread::sleep(Self::POLL_INTERVAL),
            }
        };

        let mut stdout = String::new();
        if let Some(mut pipe) = child.stdout.take() {
            pipe.read_to_string(&mut stdout)
                .map_err(|source| InferenceError::ProcessError {
                    program: self.program(),
                    source,
                })?;
        }

        if !status.success() {
            return Err(InferenceError::ProcessingError {
                message: format!("{} exited with {}", self.program(), status),
            });
        }

        Ok(stdout)
    }
}

impl Default for TesseractOsd {
    fn default() -> Self {
        Self::new("tesseract", Self::DEFAULT_TIMEOUT)
    }
}

impl OrientationScanner for TesseractOsd {
    fn scan(&self, document: &Document) -> Result<OsdReading, InferenceError> {
        let output = match document.path() {
            Some(path) => self.run(path)?,
            None => {
                let scratch = tempfile::Builder::new()
                    .prefix("osd_")
                    .suffix(".png")
                    .tempfile()
                    .map_err(|source| InferenceError::ProcessError {
                        program: self.program(),
                        source,
                    })?;
                document
                    .image()
                    .save_with_format(scratch.path(), ImageFormat::Png)
                    .map_err(|e| InferenceError::PreprocessingError {
                        operation: "write scratch image".to_string(),
                        message: e.to_string(),
                    })?;
                self.run(scratch.path())?
            }
        };

        let reading = parse_osd_output(&output);
        debug!(
            "OSD reading: angle {:?}, confidence {:?}",
            reading.angle, reading.confidence
        );
        Ok(reading)
    }
}

/// Extracts the rotation and orientation confidence from Tesseract's OSD
/// report. Lines that are missing or malformed leave the field empty.
pub fn parse_osd_output(output: &str) -> OsdReading {
    let mut reading = OsdReading::default();

    for line in output.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match key.trim() {
            "Rotate" => {
                if let Ok(clockwise) = value.parse::<i32>() {
                    reading.angle = Some(-clockwise);
                }
            }
            "Orientation confidence" => {
                if let Ok(confidence) = value.parse::<f32>() {
                    reading.confidence = Some(confidence);
                }
            }
            _ => {}
        }
    }

    reading
}
