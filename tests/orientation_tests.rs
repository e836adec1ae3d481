use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::{Rgb, RgbImage};
use sigcount::document::orientation::{
    NeuralPrediction, OrientationChain, OrientationPredictor, OrientationScanner, OrientationTier,
    OsdReading, RotationAngle,
};
use sigcount::document::{Document, DocumentType};
use sigcount::inference::InferenceError;

struct FakePredictor {
    result: Result<NeuralPrediction, String>,
    calls: AtomicUsize,
}

impl FakePredictor {
    fn class(class_index: usize, confidence: Option<f32>) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(NeuralPrediction {
                class_index,
                confidence,
            }),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            result: Err("model crashed".to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OrientationPredictor for FakePredictor {
    fn predict(&self, _image: &RgbImage) -> Result<NeuralPrediction, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result
            .clone()
            .map_err(|message| InferenceError::ProcessingError { message })
    }
}

struct FakeScanner {
    result: Result<OsdReading, String>,
    calls: AtomicUsize,
}

impl FakeScanner {
    fn reading(angle: Option<i32>, confidence: Option<f32>) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(OsdReading { angle, confidence }),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            result: Err("tesseract not installed".to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OrientationScanner for FakeScanner {
    fn scan(&self, _document: &Document) -> Result<OsdReading, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result
            .clone()
            .map_err(|message| InferenceError::ProcessingError { message })
    }
}

fn page(width: u32, height: u32) -> Document {
    let mut image = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    image.put_pixel(0, 0, Rgb([255, 0, 0]));
    Document::from_image(image, DocumentType::Png)
}

#[test]
fn test_low_osd_confidence_falls_back_to_dimensions() {
    let scanner = FakeScanner::reading(Some(90), Some(5.0));
    let chain = OrientationChain::new().with_scanner(scanner.clone());
    let mut document = page(800, 600);

    let outcome = chain.correct_orientation(&mut document);

    assert_eq!(outcome.angle, RotationAngle::Clockwise90);
    assert_eq!(outcome.angle.degrees(), -90);
    assert_eq!(outcome.tier, OrientationTier::Dimensions);
    assert!(outcome.rotated);
    assert_eq!(document.dimensions(), (600, 800));
    assert_eq!(scanner.calls(), 1);
}

#[test]
fn test_neural_result_short_circuits_other_tiers() {
    let predictor = FakePredictor::class(2, Some(0.97));
    let scanner = FakeScanner::reading(Some(90), Some(50.0));
    let chain = OrientationChain::new()
        .with_predictor(predictor.clone())
        .with_scanner(scanner.clone());
    let mut document = page(800, 600);

    let outcome = chain.correct_orientation(&mut document);

    assert_eq!(outcome.angle, RotationAngle::UpsideDown);
    assert_eq!(outcome.tier, OrientationTier::Neural);
    assert!(outcome.rotated);
    // 180 keeps the landscape shape the heuristic would have changed.
    assert_eq!(document.dimensions(), (800, 600));
    assert_eq!(document.image().get_pixel(799, 599), &Rgb([255, 0, 0]));
    assert_eq!(predictor.calls(), 1);
    assert_eq!(scanner.calls(), 0);
}

#[test]
fn test_neural_upright_is_final() {
    let predictor = FakePredictor::class(0, Some(0.9));
    let scanner = FakeScanner::reading(Some(90), Some(50.0));
    let chain = OrientationChain::new()
        .with_predictor(predictor)
        .with_scanner(scanner.clone());
    let mut document = page(800, 600);

    let outcome = chain.correct_orientation(&mut document);

    assert_eq!(outcome.angle, RotationAngle::Upright);
    assert_eq!(outcome.tier, OrientationTier::Neural);
    assert!(!outcome.rotated);
    assert_eq!(document.dimensions(), (800, 600));
    assert_eq!(scanner.calls(), 0);
}

#[test]
fn test_neural_failure_uses_osd() {
    let chain = OrientationChain::new()
        .with_predictor(FakePredictor::failing())
        .with_scanner(FakeScanner::reading(Some(90), Some(42.0)));
    let mut document = page(600, 800);

    let outcome = chain.correct_orientation(&mut document);

    assert_eq!(outcome.angle, RotationAngle::CounterClockwise90);
    assert_eq!(outcome.tier, OrientationTier::Osd);
    assert!(outcome.rotated);
    assert_eq!(document.dimensions(), (800, 600));
}

#[test]
fn test_unknown_neural_class_uses_osd() {
    let chain = OrientationChain::new()
        .with_predictor(FakePredictor::class(7, Some(0.99)))
        .with_scanner(FakeScanner::reading(Some(180), Some(30.0)));

    let decision = chain.decide(&page(100, 100));

    assert_eq!(decision.angle, RotationAngle::UpsideDown);
    assert_eq!(decision.tier, OrientationTier::Osd);
}

#[test]
fn test_neural_below_min_confidence_uses_osd() {
    let chain = OrientationChain::new()
        .with_predictor(FakePredictor::class(1, Some(0.4)))
        .with_neural_min_confidence(0.5)
        .with_scanner(FakeScanner::reading(Some(0), Some(30.0)));

    let decision = chain.decide(&page(100, 100));

    assert_eq!(decision.angle, RotationAngle::Upright);
    assert_eq!(decision.tier, OrientationTier::Osd);
}

#[test]
fn test_zero_osd_confidence_falls_back_to_dimensions() {
    let chain = OrientationChain::new().with_scanner(FakeScanner::reading(Some(180), Some(0.0)));

    let decision = chain.decide(&page(800, 600));

    assert_eq!(decision.angle, RotationAngle::Clockwise90);
    assert_eq!(decision.tier, OrientationTier::Dimensions);
}

#[test]
fn test_osd_without_confidence_is_accepted() {
    let chain = OrientationChain::new().with_scanner(FakeScanner::reading(Some(180), None));

    let decision = chain.decide(&page(800, 600));

    assert_eq!(decision.angle, RotationAngle::UpsideDown);
    assert_eq!(decision.tier, OrientationTier::Osd);
}

#[test]
fn test_osd_at_threshold_is_accepted() {
    let chain = OrientationChain::new().with_scanner(FakeScanner::reading(Some(-90), Some(10.0)));

    let decision = chain.decide(&page(600, 800));

    assert_eq!(decision.angle, RotationAngle::Clockwise90);
    assert_eq!(decision.tier, OrientationTier::Osd);
}

#[test]
fn test_osd_without_angle_falls_back() {
    let chain = OrientationChain::new().with_scanner(FakeScanner::reading(None, Some(80.0)));

    let decision = chain.decide(&page(600, 800));

    assert_eq!(decision.angle, RotationAngle::Upright);
    assert_eq!(decision.tier, OrientationTier::Dimensions);
}

#[test]
fn test_osd_error_falls_back_to_dimensions() {
    let scanner = FakeScanner::failing();
    let chain = OrientationChain::new()
        .with_predictor(FakePredictor::failing())
        .with_scanner(scanner.clone());
    let mut document = page(1200, 900);

    let outcome = chain.correct_orientation(&mut document);

    assert_eq!(outcome.tier, OrientationTier::Dimensions);
    assert_eq!(outcome.angle, RotationAngle::Clockwise90);
    assert!(outcome.rotated);
    assert_eq!(scanner.calls(), 1);
}

#[test]
fn test_portrait_without_signals_is_untouched() {
    let chain = OrientationChain::new();
    let mut document = page(600, 800);
    let before = document.image().clone();

    let outcome = chain.correct_orientation(&mut document);

    assert_eq!(outcome.angle, RotationAngle::Upright);
    assert!(!outcome.rotated);
    assert_eq!(document.image(), &before);
}

#[test]
fn test_square_page_is_not_rotated() {
    let decision = OrientationChain::new().decide(&page(500, 500));
    assert_eq!(decision.angle, RotationAngle::Upright);
}

#[test]
fn test_rotation_is_written_to_backing_file() {
    let mut bytes = Vec::new();
    RgbImage::from_pixel(40, 20, Rgb([10, 20, 30]))
        .write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();

    let temp_dir = tempfile::tempdir().unwrap();
    let mut document = Document::new_in(&bytes, "scan.png", Some(temp_dir.path())).unwrap();

    let outcome = OrientationChain::new().correct_orientation(&mut document);
    assert!(outcome.rotated);

    let path = document.path().unwrap().to_path_buf();
    let on_disk = image::open(&path).unwrap();
    assert_eq!((on_disk.width(), on_disk.height()), (20, 40));
    assert_eq!(document.dimensions(), (20, 40));
}

#[test]
fn test_failed_write_back_leaves_page_untouched() {
    let mut bytes = Vec::new();
    RgbImage::from_pixel(40, 20, Rgb([10, 20, 30]))
        .write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();

    let temp_dir = tempfile::tempdir().unwrap();
    let mut document = Document::new_in(&bytes, "scan.png", Some(temp_dir.path())).unwrap();
    let before = document.image().clone();

    // A directory in place of the backing file makes the write fail.
    let path = document.path().unwrap().to_path_buf();
    std::fs::remove_file(&path).unwrap();
    std::fs::create_dir(&path).unwrap();

    let outcome = OrientationChain::new().correct_orientation(&mut document);

    assert_eq!(outcome.angle, RotationAngle::Clockwise90);
    assert_eq!(outcome.tier, OrientationTier::Dimensions);
    assert!(!outcome.rotated);
    assert_eq!(document.dimensions(), (40, 20));
    assert_eq!(document.image(), &before);
}
