use crate::libs::distance::DistanceStats;

/// Exponent of the ease-out curve. Below 1, near relatives score higher than
/// a linear ramp would give them.
const EASE_EXPONENT: f64 = 0.65;

/// Similarity score in 1..=100 for an effective distance.
///
/// Anchored to the target's distance range when a target is active, otherwise
/// to the pairwise range of the round. Without any usable maximum the score
/// decays as `100 / (1 + d)`, kept within 5..=95.
///
/// ```
/// use phylodist::libs::distance::DistanceStats;
/// use phylodist::libs::score::distance_to_score;
///
/// let stats = DistanceStats::default();
/// assert_eq!(distance_to_score(None, &stats), None);
/// assert_eq!(distance_to_score(Some(0.0), &stats), Some(100));
/// assert_eq!(distance_to_score(Some(1.0), &stats), Some(50));
/// ```
pub fn distance_to_score(distance: Option<f64>, stats: &DistanceStats) -> Option<u8> {
    let d = distance.filter(|d| !d.is_nan())?;
    if d <= 0.0 {
        return Some(100);
    }

    let max = if stats.target_active && stats.target_max > 0.0 {
        stats.target_max
    } else {
        stats.baseline_max()
    };
    if !max.is_finite() || max <= 0.0 {
        return Some(fallback(d));
    }

    let min = if stats.target_active {
        stats.target_min_positive
    } else {
        stats.min_pairwise
    };
    let min = min.clamp(0.0, max);

    let clamped = d.clamp(min, max);
    let normalized = if max > min {
        (clamped - min) / (max - min)
    } else {
        0.0
    };
    let eased = 1.0 - normalized.powf(EASE_EXPONENT);

    Some((1.0 + eased * 98.0).round().clamp(1.0, 100.0) as u8)
}

fn fallback(d: f64) -> u8 {
    (100.0 / (1.0 + d)).round().clamp(5.0, 95.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target_stats(min: f64, max: f64) -> DistanceStats {
        DistanceStats {
            max_pairwise: max,
            min_pairwise: min,
            global_max_pairwise: max,
            target_max: max,
            target_min_positive: min,
            target_scale_factor: 0.0,
            target_active: true,
        }
    }

    #[test]
    fn test_no_data() {
        let stats = target_stats(2.0, 12.0);
        assert_eq!(distance_to_score(None, &stats), None);
        assert_eq!(distance_to_score(Some(f64::NAN), &stats), None);
    }

    #[test]
    fn test_identity() {
        let stats = target_stats(2.0, 12.0);
        assert_eq!(distance_to_score(Some(0.0), &stats), Some(100));
        assert_eq!(distance_to_score(Some(-3.0), &stats), Some(100));
    }

    #[test]
    fn test_anchored_range() {
        let stats = target_stats(2.0, 12.0);
        assert_eq!(distance_to_score(Some(2.0), &stats), Some(99));
        assert_eq!(distance_to_score(Some(12.0), &stats), Some(1));
        // clamped onto the anchors
        assert_eq!(distance_to_score(Some(1.0), &stats), Some(99));
        assert_eq!(distance_to_score(Some(50.0), &stats), Some(1));
        assert_eq!(distance_to_score(Some(f64::INFINITY), &stats), Some(1));

        // halfway: 1 + (1 - 0.5^0.65) * 98
        let expected = (1.0 + (1.0 - 0.5f64.powf(0.65)) * 98.0).round() as u8;
        assert_eq!(distance_to_score(Some(7.0), &stats), Some(expected));
    }

    #[test]
    fn test_monotone_non_increasing() {
        let stats = target_stats(0.3, 25.0);
        let mut prev = 100;
        for i in 1..=300 {
            let score = distance_to_score(Some(i as f64 * 0.1), &stats).unwrap();
            assert!((1..=100).contains(&score));
            assert!(score <= prev);
            prev = score;
        }
    }

    #[test]
    fn test_without_target_uses_pairwise() {
        let stats = DistanceStats {
            max_pairwise: 10.0,
            min_pairwise: 1.0,
            global_max_pairwise: 20.0,
            ..DistanceStats::default()
        };
        // ceiling is the high-water mark
        assert_eq!(distance_to_score(Some(20.0), &stats), Some(1));
        assert_eq!(distance_to_score(Some(1.0), &stats), Some(99));
        assert!(distance_to_score(Some(10.0), &stats).unwrap() > 1);
    }

    #[test]
    fn test_flat_range() {
        let stats = target_stats(4.0, 4.0);
        assert_eq!(distance_to_score(Some(4.0), &stats), Some(99));
    }

    #[test]
    fn test_fallback() {
        let stats = DistanceStats::default();
        assert_eq!(distance_to_score(Some(1.0), &stats), Some(50));
        assert_eq!(distance_to_score(Some(0.01), &stats), Some(95));
        assert_eq!(distance_to_score(Some(1000.0), &stats), Some(5));
        assert_eq!(distance_to_score(Some(f64::INFINITY), &stats), Some(5));
    }
}
