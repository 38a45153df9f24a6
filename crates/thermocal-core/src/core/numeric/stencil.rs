use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum StencilError {
    #[error("Stencil half-width must be at least 1")]
    ZeroHalfWidth,
    #[error("Stencil step must be positive and finite, got {0}")]
    InvalidStep(f64),
    #[error("Stencil with half-width {half_width} needs {expected} samples, got {found}")]
    WindowSize {
        half_width: usize,
        expected: usize,
        found: usize,
    },
}

/// Second derivative at the center of `2m + 1` uniformly spaced samples.
///
/// Fits a least-squares quadratic through the window and returns twice its leading
/// coefficient. Exact for quadratics.
pub fn second_derivative<I>(samples: I, step: f64, half_width: usize) -> Result<f64, StencilError>
where
    I: IntoIterator<Item = f64>,
{
    if half_width == 0 {
        return Err(StencilError::ZeroHalfWidth);
    }
    if !(step.is_finite() && step > 0.0) {
        return Err(StencilError::InvalidStep(step));
    }

    let m = half_width as f64;
    let n = 2 * half_width + 1;
    let nf = n as f64;
    let a = m * (m + 1.0) * (2.0 * m + 1.0) / 3.0;
    let b = m * (m + 1.0) * (2.0 * m + 1.0) * (3.0 * m * m + 3.0 * m - 1.0) / 15.0;

    let mut count = 0;
    let mut numerator = 0.0;
    for (i, f) in samples.into_iter().enumerate() {
        let offset = i as f64 - m;
        numerator += f * (a - nf * offset * offset);
        count += 1;
    }
    if count != n {
        return Err(StencilError::WindowSize {
            half_width,
            expected: n,
            found: count,
        });
    }

    Ok(numerator / ((a * a - b * nf) * step * step / 2.0))
}
