use rampread::time_series::SpeedSample;

/// Axis bounds for the speed chart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartBounds {
    /// Seconds, at least 1
    pub duration: f64,
    /// Lowest speed rounded down to a 50 WPM gridline
    pub floor_wpm: f64,
    /// Highest speed rounded up to a 50 WPM gridline
    pub ceil_wpm: f64,
}

const WPM_GRID: f64 = 50.0;

pub fn compute_chart_params(samples: &[SpeedSample]) -> ChartBounds {
    let (lo, hi) = samples.iter().fold((f64::MAX, 0.0_f64), |(lo, hi), s| {
        (lo.min(s.wpm), hi.max(s.wpm))
    });

    let duration = samples.last().map_or(1.0, |s| s.t).max(1.0);
    if samples.is_empty() {
        return ChartBounds {
            duration,
            floor_wpm: 0.0,
            ceil_wpm: WPM_GRID,
        };
    }

    let floor_wpm = (lo / WPM_GRID).floor() * WPM_GRID;
    let mut ceil_wpm = (hi / WPM_GRID).ceil() * WPM_GRID;
    if ceil_wpm <= floor_wpm {
        ceil_wpm = floor_wpm + WPM_GRID;
    }

    ChartBounds {
        duration,
        floor_wpm,
        ceil_wpm,
    }
}

pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_trace_has_unit_bounds() {
        let b = compute_chart_params(&[]);
        assert_eq!(b.duration, 1.0);
        assert_eq!(b.floor_wpm, 0.0);
        assert_eq!(b.ceil_wpm, 50.0);
    }

    #[test]
    fn bounds_snap_to_grid() {
        let samples = [SpeedSample::new(0.0, 310.0), SpeedSample::new(42.5, 488.0)];
        let b = compute_chart_params(&samples);
        assert_eq!(b.duration, 42.5);
        assert_eq!(b.floor_wpm, 300.0);
        assert_eq!(b.ceil_wpm, 500.0);
    }

    #[test]
    fn flat_trace_still_has_height() {
        let samples = [SpeedSample::new(0.0, 300.0), SpeedSample::new(10.0, 300.0)];
        let b = compute_chart_params(&samples);
        assert_eq!(b.floor_wpm, 300.0);
        assert_eq!(b.ceil_wpm, 350.0);
    }

    #[test]
    fn labels() {
        assert_eq!(format_label(300.0), "300");
        assert_eq!(format_label(12.34), "12.3");
    }
}
