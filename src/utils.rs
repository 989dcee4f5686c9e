// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Geometry and statistics helpers shared by the analysis and update stages.

/// Guard against division by zero in area and scale terms.
pub const EPS: f32 = 1e-9;

/// Calculate `IoU` (Intersection over Union) between two center-form boxes.
///
/// # Arguments
///
/// * `box1` - First bounding box [cx, cy, w, h]
/// * `box2` - Second bounding box [cx, cy, w, h]
///
/// # Returns
///
/// `IoU` value between 0.0 and 1.0
#[must_use]
pub fn calculate_iou(box1: &[f32; 4], box2: &[f32; 4]) -> f32 {
    let (b1_x1, b1_y1, b1_x2, b1_y2) = box_corners(box1);
    let (b2_x1, b2_y1, b2_x2, b2_y2) = box_corners(box2);

    let inter_x1 = b1_x1.max(b2_x1);
    let inter_y1 = b1_y1.max(b2_y1);
    let inter_x2 = b1_x2.min(b2_x2);
    let inter_y2 = b1_y2.min(b2_y2);

    let intersection = ((inter_x2 - inter_x1).max(0.0)) * ((inter_y2 - inter_y1).max(0.0));
    let union = box1[2].mul_add(box1[3], box2[2] * box2[3]) - intersection;

    intersection / (union + EPS)
}

/// Corner coordinates `(x1, y1, x2, y2)` of a center-form box.
#[must_use]
pub fn box_corners(bbox: &[f32; 4]) -> (f32, f32, f32, f32) {
    let [cx, cy, w, h] = *bbox;
    (
        cx - w / 2.0,
        cy - h / 2.0,
        cx + w / 2.0,
        cy + h / 2.0,
    )
}

/// Check whether a point lies inside a center-form box.
///
/// The box boundary counts as inside (non-strict comparison).
#[must_use]
pub fn point_in_box(x: f32, y: f32, bbox: &[f32; 4]) -> bool {
    let (x_min, y_min, x_max, y_max) = box_corners(bbox);
    x >= x_min && x <= x_max && y >= y_min && y <= y_max
}

/// Object Keypoint Similarity of one predicted keypoint against ground truth.
///
/// `scale` is the matched prediction's box area (an approximation of object
/// area) and `sigma` the per-keypoint falloff constant. Returns 1.0 at zero
/// distance and decays as a Gaussian of the distance.
///
/// # Arguments
///
/// * `pred` - Predicted keypoint `(x, y)`.
/// * `gt` - Ground-truth keypoint `(x, y)`.
/// * `scale` - Box area `w * h` of the matched prediction.
/// * `sigma` - Per-keypoint constant, strictly positive.
#[must_use]
pub fn keypoint_oks(pred: (f32, f32), gt: (f32, f32), scale: f32, sigma: f32) -> f32 {
    let dist_sq = (pred.0 - gt.0).powi(2) + (pred.1 - gt.1).powi(2);
    (-dist_sq / (2.0 * (scale + EPS) * sigma.powi(2))).exp()
}

/// Percentile of a sample set with linear interpolation between ranks.
///
/// Returns `None` on an empty slice. The input does not need to be sorted;
/// the result is a pure function of the multiset of values.
///
/// # Panics
///
/// Panics if `partial_cmp` fails for floating point comparisons (e.g. NaN).
#[must_use]
pub fn percentile(values: &[f32], q: f32) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

    #[allow(clippy::cast_precision_loss)]
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f32;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let lower = pos.floor() as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    let fraction = pos - pos.floor();

    Some((sorted[upper] - sorted[lower]).mul_add(fraction, sorted[lower]))
}

/// Median of a sample set (50th percentile). `None` on an empty slice.
#[must_use]
pub fn median(values: &[f32]) -> Option<f32> {
    percentile(values, 0.5)
}

/// Arithmetic mean of a sample set. `None` on an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f32>() / values.len() as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iou_identical_box() {
        let bbox = [0.5, 0.5, 0.4, 0.4];
        let iou = calculate_iou(&bbox, &bbox);
        assert!((iou - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_disjoint_boxes() {
        let box1 = [0.2, 0.2, 0.2, 0.2];
        let box2 = [0.8, 0.8, 0.2, 0.2];
        assert_eq!(calculate_iou(&box1, &box2), 0.0);
    }

    #[test]
    fn test_iou_partial_overlap() {
        // Quarter overlap: inter 0.01, union 0.07.
        let box1 = [0.3, 0.3, 0.2, 0.2];
        let box2 = [0.4, 0.4, 0.2, 0.2];
        let iou = calculate_iou(&box1, &box2);
        assert!((iou - 1.0 / 7.0).abs() < 1e-5);
    }

    #[test]
    fn test_point_in_box_boundary_inclusive() {
        // Exactly representable corners: 0.25 .. 0.75 on both axes.
        let bbox = [0.5, 0.5, 0.5, 0.5];
        assert!(point_in_box(0.5, 0.5, &bbox));
        assert!(point_in_box(0.25, 0.5, &bbox)); // left edge
        assert!(point_in_box(0.75, 0.75, &bbox)); // corner
        assert!(!point_in_box(0.2, 0.5, &bbox));
        assert!(!point_in_box(0.5, 0.8, &bbox));
    }

    #[test]
    fn test_oks_zero_distance_is_one() {
        let oks = keypoint_oks((0.5, 0.5), (0.5, 0.5), 0.16, 0.35);
        assert_eq!(oks, 1.0);
    }

    #[test]
    fn test_oks_monotonically_decreasing() {
        let gt = (0.5, 0.5);
        let mut last = 1.0;
        for step in 1..10 {
            #[allow(clippy::cast_precision_loss)]
            let dx = 0.02 * step as f32;
            let oks = keypoint_oks((0.5 + dx, 0.5), gt, 0.16, 0.35);
            assert!(oks < last, "OKS must decrease with distance");
            assert!(oks > 0.0);
            last = oks;
        }
    }

    #[test]
    fn test_percentile_interpolation() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&values, 0.0), Some(1.0));
        assert_eq!(percentile(&values, 1.0), Some(4.0));
        assert_eq!(percentile(&values, 0.5), Some(2.5));
        // pos = 0.1 * 3 = 0.3 -> 1.0 + 0.3 * (2.0 - 1.0)
        let p10 = percentile(&values, 0.1).unwrap();
        assert!((p10 - 1.3).abs() < 1e-6);
    }

    #[test]
    fn test_percentile_order_invariant() {
        let sorted = [0.1, 0.4, 0.6, 0.9];
        let shuffled = [0.9, 0.1, 0.6, 0.4];
        assert_eq!(percentile(&sorted, 0.95), percentile(&shuffled, 0.95));
        assert_eq!(median(&sorted), median(&shuffled));
    }

    #[test]
    fn test_percentile_empty_and_single() {
        assert_eq!(percentile(&[], 0.5), None);
        assert_eq!(percentile(&[0.7], 0.1), Some(0.7));
        assert_eq!(median(&[0.7]), Some(0.7));
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
    }
}
