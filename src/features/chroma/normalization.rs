//! Chroma normalization and variant blending

use super::ChromaVector;

const EPSILON: f64 = 1e-10;

/// Scale a 12-bin vector so its bins sum to 1.0
///
/// An all-zero (or non-positive) vector is returned as all zeros.
pub fn l1_normalize(bins: &[f64; 12]) -> ChromaVector {
    let sum: f64 = bins.iter().sum();
    if sum <= EPSILON {
        return ChromaVector::zero();
    }
    let mut out = [0.0; 12];
    for (o, &b) in out.iter_mut().zip(bins) {
        *o = b / sum;
    }
    ChromaVector(out)
}

/// Weighted blend of chroma vectors, renormalized by the total weight
///
/// Each element of `parts` is `(vector, weight)`. Only the vectors present
/// contribute, so dropping a failed variant does not shrink the result.
pub fn combine_weighted(parts: &[(ChromaVector, f64)]) -> ChromaVector {
    let total_weight: f64 = parts.iter().map(|(_, w)| *w).sum();
    if total_weight <= EPSILON {
        return ChromaVector::zero();
    }

    let mut out = [0.0; 12];
    for (vector, weight) in parts {
        for (o, &v) in out.iter_mut().zip(vector.values()) {
            *o += v * weight;
        }
    }
    for o in out.iter_mut() {
        *o /= total_weight;
    }
    ChromaVector(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_l1_normalize_sums_to_one() {
        let mut bins = [0.0; 12];
        bins[0] = 3.0;
        bins[7] = 1.0;
        let chroma = l1_normalize(&bins);
        assert!((chroma.values().iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((chroma.values()[0] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_l1_normalize_zero() {
        assert!(l1_normalize(&[0.0; 12]).is_zero());
    }

    #[test]
    fn test_combine_renormalizes_by_weight() {
        let mut a = [0.0; 12];
        a[0] = 1.0;
        let mut b = [0.0; 12];
        b[4] = 1.0;
        let combined = combine_weighted(&[(ChromaVector(a), 0.40), (ChromaVector(b), 0.35)]);
        assert!((combined.values().iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((combined.values()[0] - 0.40 / 0.75).abs() < 1e-12);
    }
}
