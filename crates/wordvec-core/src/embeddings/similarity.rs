//! Vector math shared by lookups and nearest-neighbour queries.
//!
//! Lengths are expected to match; all functions tolerate a mismatch without
//! panicking, since a zero vector from an OOV lookup can meet anything.

/// Sum of element-wise products over the common prefix of `a` and `b`
#[inline]
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).fold(0.0, |acc, (x, y)| acc + x * y)
}

/// Euclidean length of a vector
#[inline]
pub fn l2_norm(vector: &[f32]) -> f32 {
    dot_product(vector, vector).sqrt()
}

/// Cosine similarity in `[-1, 1]`
///
/// Returns 0.0 for mismatched lengths or when either vector is all zeros
/// (which is what OOV lookups produce).
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    cosine_with_norm(a, l2_norm(a), b)
}

/// Cosine against a query whose norm is already known
#[inline]
pub(crate) fn cosine_with_norm(query: &[f32], query_norm: f32, other: &[f32]) -> f32 {
    let scale = query_norm * l2_norm(other);
    if scale == 0.0 {
        return 0.0;
    }
    dot_product(query, other) / scale
}

/// Straight-line distance; `f32::MAX` when the lengths differ
#[inline]
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::MAX;
    }
    let squared: f32 = a
        .iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum();
    squared.sqrt()
}

/// Scale a vector to unit length in place. Zero vectors are left untouched.
#[inline]
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = l2_norm(vector);
    if norm > 0.0 {
        vector.iter_mut().for_each(|x| *x /= norm);
    }
}
