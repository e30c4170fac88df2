// Per-frame reduction and analysis: sampling regions out of frames, rolling
// per-region series, spectral estimation, and the session state machine that
// ties them together.

pub mod linescan;
pub mod sampler;
pub mod series;
pub mod session;
pub mod spectral;

/// Truncates two sequences to their common length. Series and spectra travel
/// as (x, y) pairs; producers occasionally leave them one element apart, and
/// every consumer wants them aligned.
pub fn snip_pair(x: &[f64], y: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let n = x.len().min(y.len());
    (x[..n].to_vec(), y[..n].to_vec())
}
