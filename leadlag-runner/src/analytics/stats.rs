//! Normalization and correlation: pure functions over plain numbers.

use super::resample::MonthlySeries;

/// Population mean and standard deviation of the finite values.
///
/// `None` when fewer than two finite values exist.
fn moments<'a, I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = &'a f64>,
{
    let finite: Vec<f64> = values.into_iter().copied().filter(|v| v.is_finite()).collect();
    if finite.len() < 2 {
        return None;
    }
    let n = finite.len() as f64;
    let mean = finite.iter().sum::<f64>() / n;
    let var = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some((mean, var.sqrt()))
}

/// Z-score over the full history with population statistics.
///
/// A zero or undefined standard deviation yields all zeros.
pub fn zscore(series: &MonthlySeries) -> MonthlySeries {
    match moments(series.values()) {
        Some((mean, std)) if std > 0.0 && std.is_finite() => series
            .iter()
            .map(|(m, v)| (*m, (v - mean) / std))
            .collect(),
        _ => series.keys().map(|m| (*m, 0.0)).collect(),
    }
}

/// Z-score of a plain slice. Non-finite entries are ignored by the
/// statistics and passed through unchanged.
pub fn zscore_values(values: &[f64]) -> Vec<f64> {
    match moments(values) {
        Some((mean, std)) if std > 0.0 && std.is_finite() => values
            .iter()
            .map(|v| if v.is_finite() { (v - mean) / std } else { *v })
            .collect(),
        _ => values
            .iter()
            .map(|v| if v.is_finite() { 0.0 } else { *v })
            .collect(),
    }
}

/// Pearson correlation of two equal-length samples.
///
/// `None` for mismatched lengths, fewer than two pairs, or zero variance on
/// either side.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let n = xs.len() as f64;
    let mx = xs.iter().sum::<f64>() / n;
    let my = ys.iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    let r = sxy / (sxx.sqrt() * syy.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}
