//! Linear-interpolation rate conversion.
//!
//! Stateless by construction: every call stands alone, with no filter
//! memory across buffers. Adequate for feeding fixed-rate classifiers;
//! not a broadcast-quality resampler.

/// Convert `input` from `from_rate` to `to_rate`.
///
/// Output length is `floor(len / (from/to))`; a ratio of exactly 1.0
/// returns the input unchanged.
pub fn resample_linear(input: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || input.is_empty() {
        return input.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (input.len() as f64 / ratio) as usize;
    let last = input.len() - 1;

    let mut output = Vec::with_capacity(output_len);
    for i in 0..output_len {
        let src = i as f64 * ratio;
        let idx0 = src as usize;
        let idx1 = (idx0 + 1).min(last);
        let frac = (src - idx0 as f64) as f32;
        output.push(input[idx0] * (1.0 - frac) + input[idx1] * frac);
    }
    output
}
