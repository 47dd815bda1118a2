//! Length normalisation for embedding vectors.
//!
//! Two policies exist. Keyed providers are fitted with [`zero_pad`]: the
//! native vector is right-padded with zeros or truncated. The vector that
//! finally leaves the fallback chain goes through [`tile`]: it is repeated
//! end-to-end until long enough, then truncated.

/// Right-pad with zeros or truncate to exactly `dims` components.
pub fn zero_pad(mut vector: Vec<f32>, dims: usize) -> Vec<f32> {
    vector.resize(dims, 0.0);
    vector
}

/// Repeat `vector` end-to-end until it has at least `dims` components, then
/// truncate to exactly `dims`. An empty input yields all zeros.
pub fn tile(vector: Vec<f32>, dims: usize) -> Vec<f32> {
    if vector.len() >= dims {
        let mut vector = vector;
        vector.truncate(dims);
        return vector;
    }
    if vector.is_empty() {
        return vec![0.0; dims];
    }
    vector.iter().copied().cycle().take(dims).collect()
}
