//! Median smoothing for magnitude spectra
//!
//! A short median filter across frequency bins suppresses isolated
//! transient and noise bins while keeping sustained harmonic peaks.

/// Apply a centred median filter of `taps` points
///
/// Near the edges the window is truncated to the points that exist. A `taps`
/// value of 0 or 1 returns the input unchanged.
///
/// # Example
///
/// ```
/// use stratum_master::features::chroma::smoothing::median_filter;
///
/// let smoothed = median_filter(&[0.0, 0.0, 9.0, 0.0, 0.0], 5);
/// assert_eq!(smoothed, vec![0.0; 5]);
/// ```
pub fn median_filter(values: &[f64], taps: usize) -> Vec<f64> {
    if taps <= 1 || values.is_empty() {
        return values.to_vec();
    }

    let half = taps / 2;
    let mut window = Vec::with_capacity(taps);
    (0..values.len())
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + half + 1).min(values.len());
            window.clear();
            window.extend_from_slice(&values[start..end]);
            window.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let mid = window.len() / 2;
            if window.len() % 2 == 1 {
                window[mid]
            } else {
                0.5 * (window[mid - 1] + window[mid])
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_removes_spike() {
        let values = vec![1.0, 1.0, 1.0, 50.0, 1.0, 1.0, 1.0];
        let smoothed = median_filter(&values, 5);
        assert_eq!(smoothed[3], 1.0);
    }

    #[test]
    fn test_median_keeps_broad_peak() {
        let values = vec![0.0, 2.0, 5.0, 5.0, 5.0, 2.0, 0.0];
        let smoothed = median_filter(&values, 5);
        assert_eq!(smoothed[3], 5.0);
        assert_eq!(smoothed.len(), values.len());
    }

    #[test]
    fn test_median_edges_truncated() {
        // first point sees [3, 1, 2] -> 2
        let smoothed = median_filter(&[3.0, 1.0, 2.0, 8.0], 5);
        assert_eq!(smoothed[0], 2.0);
    }

    #[test]
    fn test_single_tap_is_identity() {
        let values = vec![0.3, 0.1, 0.2];
        assert_eq!(median_filter(&values, 1), values);
    }
}
