use std::cmp::Ordering;

use ndarray::{Array1, ArrayView1};

/// Scales `vector` to unit L2 norm in place. Zero vectors are left untouched.
pub fn normalize_l2(vector: &mut Array1<f32>) {
    let norm = l2_norm(vector.view());
    if norm > f32::EPSILON {
        vector.mapv_inplace(|value| value / norm);
    }
}

pub fn l2_norm(vector: ArrayView1<'_, f32>) -> f32 {
    vector.dot(&vector).sqrt()
}

/// Inner product of two unit vectors, i.e. their cosine similarity.
pub fn inner_product(left: ArrayView1<'_, f32>, right: ArrayView1<'_, f32>) -> f32 {
    left.dot(&right)
}

/// Orders `(index, score)` pairs by descending score.
///
/// The sort is stable: candidates with equal scores keep their original
/// relative order, so earlier indices win ties.
pub fn rank_descending(scores: &mut [(usize, f32)]) {
    scores.sort_by(|left, right| match right.1.partial_cmp(&left.1) {
        Some(ordering) => ordering,
        None => right.1.is_nan().cmp(&left.1.is_nan()).reverse(),
    });
}
