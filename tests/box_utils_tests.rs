use sigcount::document::{BoundingBox, ScoredBox};
use sigcount::utils::box_utils::{calculate_iou, deduplicate};

fn scored(coords: [f32; 4], confidence: f32) -> ScoredBox {
    ScoredBox::new(BoundingBox::from(coords), confidence)
}

#[test]
fn test_calculate_iou_identical() {
    let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    let iou = calculate_iou(&a, &a);
    assert!((iou - 1.0).abs() < 1e-6);
}

#[test]
fn test_calculate_iou_disjoint() {
    let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    let b = BoundingBox::new(20.0, 20.0, 30.0, 30.0);
    assert_eq!(calculate_iou(&a, &b), 0.0);
}

#[test]
fn test_calculate_iou_touching_edges() {
    let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    let b = BoundingBox::new(10.0, 0.0, 20.0, 10.0);
    assert_eq!(calculate_iou(&a, &b), 0.0);
}

#[test]
fn test_calculate_iou_partial() {
    // Intersection 9x9 = 81, union 100 + 100 - 81 = 119
    let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    let b = BoundingBox::new(1.0, 1.0, 11.0, 11.0);
    let iou = calculate_iou(&a, &b);
    assert!((iou - 81.0 / 119.0).abs() < 1e-6);
}

#[test]
fn test_calculate_iou_symmetric() {
    let pairs = [
        ([0.0, 0.0, 10.0, 10.0], [5.0, 0.0, 15.0, 10.0]),
        ([3.0, 4.0, 50.0, 20.0], [10.0, 10.0, 12.0, 60.0]),
        ([0.0, 0.0, 1.0, 1.0], [0.5, 0.5, 100.0, 100.0]),
    ];

    for (a, b) in pairs {
        let (a, b) = (BoundingBox::from(a), BoundingBox::from(b));
        assert_eq!(calculate_iou(&a, &b), calculate_iou(&b, &a));
    }
}

#[test]
fn test_calculate_iou_zero_area() {
    let line = BoundingBox::new(0.0, 0.0, 10.0, 0.0);
    assert_eq!(calculate_iou(&line, &line), 0.0);
}

#[test]
fn test_deduplicate_keeps_both_below_threshold() {
    let detections = vec![
        scored([0.0, 0.0, 10.0, 10.0], 0.9),
        scored([1.0, 1.0, 11.0, 11.0], 0.8),
    ];

    let kept = deduplicate(detections, 0.7);
    assert_eq!(kept.len(), 2);
}

#[test]
fn test_deduplicate_suppresses_at_lower_threshold() {
    let detections = vec![
        scored([1.0, 1.0, 11.0, 11.0], 0.8),
        scored([0.0, 0.0, 10.0, 10.0], 0.9),
    ];

    let kept = deduplicate(detections, 0.5);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].confidence, 0.9);
    assert_eq!(kept[0].bounds.to_array(), [0.0, 0.0, 10.0, 10.0]);
}

#[test]
fn test_deduplicate_empty() {
    assert!(deduplicate(Vec::new(), 0.7).is_empty());
}

#[test]
fn test_deduplicate_single() {
    let kept = deduplicate(vec![scored([0.0, 0.0, 5.0, 5.0], 0.3)], 0.7);
    assert_eq!(kept.len(), 1);
}

#[test]
fn test_deduplicate_threshold_one_collapses_identical() {
    let detections = vec![
        scored([0.0, 0.0, 10.0, 10.0], 0.6),
        scored([0.0, 0.0, 10.0, 10.0], 0.7),
        scored([1.0, 1.0, 11.0, 11.0], 0.5),
    ];

    let kept = deduplicate(detections, 1.0);
    assert_eq!(kept.len(), 2);
    assert_eq!(kept[0].confidence, 0.7);
    assert_eq!(kept[1].confidence, 0.5);
}

#[test]
fn test_deduplicate_threshold_zero_collapses_any_overlap() {
    let detections = vec![
        scored([0.0, 0.0, 10.0, 10.0], 0.9),
        scored([9.0, 9.0, 20.0, 20.0], 0.8),
        scored([100.0, 100.0, 110.0, 110.0], 0.7),
    ];

    let kept = deduplicate(detections, 0.0);
    assert_eq!(kept.len(), 2);
    assert_eq!(kept[0].confidence, 0.9);
    assert_eq!(kept[1].confidence, 0.7);
}

#[test]
fn test_deduplicate_is_idempotent() {
    let detections = vec![
        scored([0.0, 0.0, 10.0, 10.0], 0.9),
        scored([0.5, 0.5, 10.5, 10.5], 0.85),
        scored([50.0, 50.0, 80.0, 70.0], 0.6),
        scored([52.0, 50.0, 81.0, 71.0], 0.65),
        scored([200.0, 10.0, 260.0, 40.0], 0.4),
    ];

    let once = deduplicate(detections.clone(), 0.7);
    let twice = deduplicate(once.clone(), 0.7);

    assert!(once.len() <= detections.len());
    assert_eq!(once, twice);
}

#[test]
fn test_deduplicate_orders_by_confidence() {
    let detections = vec![
        scored([0.0, 0.0, 10.0, 10.0], 0.2),
        scored([100.0, 0.0, 110.0, 10.0], 0.9),
        scored([200.0, 0.0, 210.0, 10.0], 0.5),
    ];

    let kept = deduplicate(detections, 0.7);
    let confidences: Vec<f32> = kept.iter().map(|b| b.confidence).collect();
    assert_eq!(confidences, vec![0.9, 0.5, 0.2]);
}
