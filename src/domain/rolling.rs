//! Rolling-window helpers shared by the signal generators.
//!
//! All functions return a vector the same length as the input; warmup
//! entries (where the window does not fit yet) are `None`.

/// Rolling arithmetic mean over `window` values.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        if window == 0 || i + 1 < window {
            out.push(None);
        } else {
            let slice = &values[i + 1 - window..=i];
            out.push(Some(slice.iter().sum::<f64>() / window as f64));
        }
    }
    out
}

/// Rolling sum over `window` values.
pub fn rolling_sum(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        if window == 0 || i + 1 < window {
            out.push(None);
        } else {
            out.push(Some(values[i + 1 - window..=i].iter().sum::<f64>()));
        }
    }
    out
}

/// Rolling sample standard deviation (divisor n-1). Requires `window >= 2`.
pub fn rolling_sample_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        if window < 2 || i + 1 < window {
            out.push(None);
        } else {
            let slice = &values[i + 1 - window..=i];
            let mean = slice.iter().sum::<f64>() / window as f64;
            let ss: f64 = slice.iter().map(|v| (v - mean) * (v - mean)).sum();
            out.push(Some((ss / (window - 1) as f64).sqrt()));
        }
    }
    out
}

/// Rolling mean over an already-windowed series; a window containing any
/// `None` yields `None`.
pub fn rolling_mean_opt(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        if window == 0 || i + 1 < window {
            out.push(None);
            continue;
        }
        let slice = &values[i + 1 - window..=i];
        if slice.iter().any(|v| v.is_none()) {
            out.push(None);
        } else {
            let sum: f64 = slice.iter().map(|v| v.unwrap()).sum();
            out.push(Some(sum / window as f64));
        }
    }
    out
}

/// Bar-over-bar simple returns; the first entry is 0.
pub fn simple_returns(closes: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(closes.len());
    for i in 0..closes.len() {
        if i == 0 {
            out.push(0.0);
        } else {
            out.push(closes[i] / closes[i - 1] - 1.0);
        }
    }
    out
}

/// Sample standard deviation of a whole slice; 0 for fewer than 2 values.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    (ss / (n - 1.0)).sqrt()
}
