/// One point of the speed trace: seconds since the session started and the
/// speed shown at that moment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedSample {
    pub t: f64,
    pub wpm: f64,
}

impl SpeedSample {
    pub fn new(t: f64, wpm: f64) -> Self {
        Self { t, wpm }
    }
}

impl From<(f64, f64)> for SpeedSample {
    fn from(v: (f64, f64)) -> Self {
        SpeedSample { t: v.0, wpm: v.1 }
    }
}

impl From<SpeedSample> for (f64, f64) {
    fn from(p: SpeedSample) -> Self {
        (p.t, p.wpm)
    }
}

/// Keep only the samples where the speed changed, plus the final one, so a
/// long session at constant speed charts as a flat segment instead of
/// thousands of identical points
pub fn compress(samples: &[SpeedSample]) -> Vec<SpeedSample> {
    let mut out: Vec<SpeedSample> = Vec::new();
    for sample in samples {
        match out.last() {
            Some(prev) if prev.wpm == sample.wpm => {}
            _ => out.push(*sample),
        }
    }
    if let (Some(last), Some(kept)) = (samples.last(), out.last()) {
        if last != kept {
            out.push(*last);
        }
    }
    out
}
