/// Arithmetic mean, `None` for an empty slice
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Population standard deviation, `None` for an empty slice
pub fn std_dev(data: &[f64]) -> Option<f64> {
    let avg = mean(data)?;
    let variance = data.iter().map(|v| (avg - v).powi(2)).sum::<f64>() / data.len() as f64;
    Some(variance.sqrt())
}

/// Time-weighted mean of a step function given as `(t, value)` points.
///
/// Each value holds from its timestamp until the next one. Falls back to the
/// plain mean when the points span no time.
pub fn time_weighted_mean(points: &[(f64, f64)]) -> Option<f64> {
    let (first, last) = (points.first()?, points.last()?);
    let span = last.0 - first.0;
    if span <= 0.0 {
        let values: Vec<f64> = points.iter().map(|p| p.1).collect();
        return mean(&values);
    }
    let area: f64 = points
        .windows(2)
        .map(|w| (w[1].0 - w[0].0) * w[0].1)
        .sum();
    Some(area / span)
}
