//! Channel mixing utilities (mono mixdown, mid/side)

/// Average all channels into one
///
/// Returns an empty vector when there are no channels.
pub fn mix_to_mono(channels: &[Vec<f64>]) -> Vec<f64> {
    match channels {
        [] => Vec::new(),
        [only] => only.clone(),
        _ => {
            let len = channels[0].len();
            let scale = 1.0 / channels.len() as f64;
            (0..len)
                .map(|i| channels.iter().map(|ch| ch[i]).sum::<f64>() * scale)
                .collect()
        }
    }
}

/// Split a stereo pair into mid and side signals
///
/// `mid = (L + R) / 2`, `side = (L - R) / 2`
pub fn to_mid_side(left: &[f64], right: &[f64]) -> (Vec<f64>, Vec<f64>) {
    left.iter()
        .zip(right)
        .map(|(&l, &r)| ((l + r) * 0.5, (l - r) * 0.5))
        .unzip()
}

/// Recombine mid and side signals into left/right
///
/// `L = mid + side`, `R = mid - side`
pub fn from_mid_side(mid: &[f64], side: &[f64]) -> (Vec<f64>, Vec<f64>) {
    mid.iter()
        .zip(side)
        .map(|(&m, &s)| (m + s, m - s))
        .unzip()
}

/// Scale the stereo image of a left/right pair in place
///
/// A width of 1.0 leaves the pair unchanged, 0.0 collapses both channels
/// to the mid signal and values above 1.0 widen the image.
pub fn apply_stereo_width(left: &mut [f64], right: &mut [f64], width: f64) {
    log::debug!("Applying stereo width {:.3} to {} samples", width, left.len());
    let (mid, mut side) = to_mid_side(left, right);
    for s in side.iter_mut() {
        *s *= width;
    }
    let (l, r) = from_mid_side(&mid, &side);
    left.copy_from_slice(&l);
    right.copy_from_slice(&r);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mix_to_mono_averages() {
        let mono = mix_to_mono(&[vec![1.0, 0.5], vec![0.0, -0.5]]);
        assert_eq!(mono, vec![0.5, 0.0]);
    }

    #[test]
    fn test_mix_to_mono_single_and_empty() {
        assert_eq!(mix_to_mono(&[vec![0.25, 0.75]]), vec![0.25, 0.75]);
        assert!(mix_to_mono(&[]).is_empty());
    }

    #[test]
    fn test_stereo_width_unity_is_noop() {
        let mut left = vec![0.3, -0.2, 0.9, 0.1];
        let mut right = vec![-0.4, 0.5, 0.2, 0.1];
        let (l0, r0) = (left.clone(), right.clone());
        apply_stereo_width(&mut left, &mut right, 1.0);
        for i in 0..left.len() {
            assert!((left[i] - l0[i]).abs() < 1e-12);
            assert!((right[i] - r0[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_stereo_width_zero_collapses_to_mid() {
        let mut left = vec![0.3, -0.2, 0.9];
        let mut right = vec![-0.4, 0.5, 0.2];
        let mid: Vec<f64> = left.iter().zip(&right).map(|(l, r)| (l + r) / 2.0).collect();
        apply_stereo_width(&mut left, &mut right, 0.0);
        for i in 0..mid.len() {
            assert!((left[i] - mid[i]).abs() < 1e-12);
            assert!((right[i] - mid[i]).abs() < 1e-12);
        }
    }
}
