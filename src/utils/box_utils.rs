//! Utility functions for bounding box operations.

use crate::document::bounds::BoundingBox;
use crate::document::scored_box::ScoredBox;

/// Calculates the Intersection over Union (IoU) between two boxes.
///
/// IoU is a measure of overlap between two bounding boxes, commonly used
/// in object detection for non-maximum suppression.
///
/// # Arguments
///
/// * `a` - The first box
/// * `b` - The second box
///
/// # Returns
///
/// A value between 0.0 and 1.0 where:
/// - 0.0 indicates no overlap
/// - 1.0 indicates perfect overlap
///
/// Returns 0.0 when the union area is zero, so two degenerate boxes never
/// divide by zero.
#[inline]
#[must_use]
pub fn calculate_iou(a: &BoundingBox, b: &BoundingBox) -> f32 {
    let overlap_w = (a.x_max().min(b.x_max()) - a.x_min().max(b.x_min())).max(0.0);
    let overlap_h = (a.y_max().min(b.y_max()) - a.y_min().max(b.y_min())).max(0.0);
    let intersection = overlap_w * overlap_h;

    let union = a.area() + b.area() - intersection;

    if union > 0.0 {
        (intersection / union).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Collapses overlapping detections into one representative per object.
///
/// This is greedy Non-Maximum Suppression over a single class.
///
/// # Algorithm
///
/// 1. Order detections by confidence, highest first. The sort is stable, so
///    equal confidences keep their input order.
/// 2. Take the best remaining detection and keep it.
/// 3. Drop every remaining detection whose IoU with the box just kept is at
///    least `iou_threshold`. Boxes that do not overlap at all (IoU of 0) are
///    never dropped, even at a threshold of 0.
/// 4. Repeat until no detections remain.
///
/// # Arguments
///
/// * `detections` - Raw detector output
/// * `iou_threshold` - IoU at or above which a lower-scored box is suppressed
///
/// # Returns
///
/// The kept detections in descending confidence order. Its length is the
/// number of unique objects.
#[must_use]
pub fn deduplicate(detections: Vec<ScoredBox>, iou_threshold: f32) -> Vec<ScoredBox> {
    if detections.is_empty() {
        return detections;
    }

    let mut order: Vec<usize> = (0..detections.len()).collect();
    order.sort_by(|&a, &b| detections[b].confidence.total_cmp(&detections[a].confidence));

    let mut keep = Vec::new();
    let mut suppressed = vec![false; detections.len()];

    for (rank, &i) in order.iter().enumerate() {
        if suppressed[i] {
            continue;
        }

        keep.push(detections[i]);

        for &j in &order[rank + 1..] {
            if suppressed[j] {
                continue;
            }

            let iou = calculate_iou(&detections[i].bounds, &detections[j].bounds);
            if iou > 0.0 && iou >= iou_threshold {
                suppressed[j] = true;
            }
        }
    }

    keep
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(coords: [f32; 4], confidence: f32) -> ScoredBox {
        ScoredBox::new(BoundingBox::from(coords), confidence)
    }

    // calculate_iou Tests

    #[test]
    fn test_calculate_iou_identical() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert!((calculate_iou(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_calculate_iou_disjoint() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(20.0, 20.0, 30.0, 30.0);
        assert_eq!(calculate_iou(&a, &b), 0.0);
    }

    #[test]
    fn test_calculate_iou_partial() {
        // Intersection 5x10 = 50, union 100 + 100 - 50 = 150
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 0.0, 15.0, 10.0);
        assert!((calculate_iou(&a, &b) - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_calculate_iou_both_degenerate() {
        let a = BoundingBox::new(5.0, 5.0, 5.0, 5.0);
        assert_eq!(calculate_iou(&a, &a), 0.0);
    }

    #[test]
    fn test_calculate_iou_one_inside_other() {
        let large = BoundingBox::new(0.0, 0.0, 20.0, 20.0);
        let small = BoundingBox::new(5.0, 5.0, 15.0, 15.0);
        assert!((calculate_iou(&large, &small) - 0.25).abs() < 1e-6);
    }

    // deduplicate Tests

    #[test]
    fn test_deduplicate_empty() {
        assert!(deduplicate(Vec::new(), 0.5).is_empty());
    }

    #[test]
    fn test_deduplicate_keeps_highest_confidence() {
        let detections = vec![
            scored([1.0, 1.0, 11.0, 11.0], 0.8),
            scored([0.0, 0.0, 10.0, 10.0], 0.9),
            scored([20.0, 20.0, 30.0, 30.0], 0.7),
        ];
        let kept = deduplicate(detections, 0.5);

        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].confidence, 0.9);
        assert_eq!(kept[1].confidence, 0.7);
    }

    #[test]
    fn test_deduplicate_tie_keeps_first_in_input_order() {
        let detections = vec![
            scored([1.0, 1.0, 11.0, 11.0], 0.9),
            scored([0.0, 0.0, 10.0, 10.0], 0.9),
        ];
        let kept = deduplicate(detections, 0.5);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].bounds.to_array(), [1.0, 1.0, 11.0, 11.0]);
    }

    #[test]
    fn test_deduplicate_only_compares_against_newly_kept_box() {
        // A suppresses B, B would have suppressed C, but C never meets B.
        let detections = vec![
            scored([0.0, 0.0, 10.0, 10.0], 0.9),
            scored([4.0, 0.0, 14.0, 10.0], 0.8),
            scored([8.0, 0.0, 18.0, 10.0], 0.7),
        ];
        let kept = deduplicate(detections, 0.4);

        assert_eq!(kept.len(), 2);
        assert_eq!(kept[1].confidence, 0.7);
    }

    #[test]
    fn test_deduplicate_nan_confidence_does_not_panic() {
        let detections = vec![
            scored([0.0, 0.0, 10.0, 10.0], f32::NAN),
            scored([50.0, 50.0, 60.0, 60.0], 0.5),
        ];
        assert_eq!(deduplicate(detections, 0.5).len(), 2);
    }
}
