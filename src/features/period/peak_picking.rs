//! Peak detection utilities
//!
//! Local maxima and prominence filtering for autocorrelation functions,
//! spectra and other 1D signals.

/// Indices of interior local maxima
///
/// A point is a peak when it is strictly greater than its left neighbour and
/// at least as large as its right neighbour, so a two-point plateau reports
/// its first point once.
///
/// # Example
///
/// ```
/// use stratum_master::features::period::peak_picking::local_maxima;
///
/// let signal = vec![0.0, 0.5, 1.0, 0.7, 0.3, 0.9, 0.2];
/// assert_eq!(local_maxima(&signal), vec![2, 5]);
/// ```
pub fn local_maxima(signal: &[f64]) -> Vec<usize> {
    if signal.len() < 3 {
        return Vec::new();
    }
    (1..signal.len() - 1)
        .filter(|&i| signal[i] > signal[i - 1] && signal[i] >= signal[i + 1])
        .collect()
}

/// Peaks with a minimum height and a minimum prominence over their neighbours
///
/// Prominence here is `value[i] - max(value[i-1], value[i+1])`.
///
/// # Arguments
///
/// * `signal` - Signal to search
/// * `min_value` - Peaks must exceed this value
/// * `min_prominence` - Peaks must stand out from both neighbours by more than this
///
/// # Returns
///
/// Peak indices in ascending order
pub fn prominent_peaks(signal: &[f64], min_value: f64, min_prominence: f64) -> Vec<usize> {
    let peaks: Vec<usize> = local_maxima(signal)
        .into_iter()
        .filter(|&i| {
            let prominence = signal[i] - signal[i - 1].max(signal[i + 1]);
            signal[i] > min_value && prominence > min_prominence
        })
        .collect();

    log::debug!(
        "Prominent peaks: {} of {} points (min_value={:.3}, min_prominence={:.3})",
        peaks.len(),
        signal.len(),
        min_value,
        min_prominence
    );
    peaks
}
