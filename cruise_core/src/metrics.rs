//! Tracking performance metrics
//!
//! Post-run analysis of a completed [`TimeSeries`]. The series is split into
//! segments of constant setpoint and each segment is scored on how well the
//! velocity settled onto its target.

use serde::{Deserialize, Serialize};

use crate::record::TimeSeries;

/// Metrics for one constant-setpoint segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentMetrics {
    /// First series index of the segment
    pub start: usize,
    /// Last series index of the segment (inclusive)
    pub end: usize,
    /// Target velocity over the segment (m/s)
    pub setpoint: f64,
    /// `setpoint - velocity` at the end of the segment (m/s)
    pub final_error: f64,
    /// Largest excursion past the setpoint in the direction of approach (m/s)
    pub peak_overshoot: f64,
    /// Samples in the segment with a clamped command
    pub saturated_steps: usize,
}

/// Whole-run tracking summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackingMetrics {
    pub segments: Vec<SegmentMetrics>,
    pub saturated_steps: usize,
    /// Largest magnitude reached by the integral accumulator (m)
    pub max_abs_integral: f64,
    /// Integrated absolute tracking error (m)
    pub iae: f64,
}

impl TrackingMetrics {
    pub fn from_series(series: &TimeSeries) -> Self {
        if series.is_empty() {
            return Self::default();
        }

        let mut segments = Vec::new();
        let mut start = 0;
        for index in 1..=series.len() {
            let boundary =
                index == series.len() || series.setpoint[index] != series.setpoint[start];
            if boundary {
                segments.push(segment(series, start, index - 1));
                start = index;
            }
        }

        let saturated_steps = series.saturation.iter().filter(|s| s.is_saturated()).count();
        let max_abs_integral = series.integral.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        let iae = (1..series.len())
            .map(|k| series.error[k].abs() * (series.time[k] - series.time[k - 1]))
            .sum();

        Self {
            segments,
            saturated_steps,
            max_abs_integral,
            iae,
        }
    }

    /// Segment with the largest overshoot, if any overshoot occurred
    pub fn worst_overshoot(&self) -> Option<&SegmentMetrics> {
        self.segments
            .iter()
            .filter(|segment| segment.peak_overshoot > 0.0)
            .max_by(|a, b| a.peak_overshoot.total_cmp(&b.peak_overshoot))
    }
}

fn segment(series: &TimeSeries, start: usize, end: usize) -> SegmentMetrics {
    let setpoint = series.setpoint[start];
    // velocity the segment begins from
    let entry = series.velocity[start.saturating_sub(1)];
    let direction = (setpoint - entry).signum();

    let peak_overshoot = if setpoint == entry {
        0.0
    } else {
        series.velocity[start..=end]
            .iter()
            .map(|velocity| direction * (velocity - setpoint))
            .fold(0.0_f64, f64::max)
    };

    SegmentMetrics {
        start,
        end,
        setpoint,
        final_error: setpoint - series.velocity[end],
        peak_overshoot,
        saturated_steps: series.saturation[start..=end]
            .iter()
            .filter(|s| s.is_saturated())
            .count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Saturation;
    use crate::record::Sample;
    use approx::assert_relative_eq;

    fn series_from(rows: &[(f64, f64, Saturation)]) -> TimeSeries {
        let mut series = TimeSeries::default();
        for (index, &(setpoint, velocity, saturation)) in rows.iter().enumerate() {
            let previous = if index == 0 { velocity } else { rows[index - 1].1 };
            series.push(Sample {
                time: index as f64,
                setpoint,
                velocity,
                error: if index == 0 { 0.0 } else { setpoint - previous },
                integral: -(index as f64),
                command: 0.0,
                saturation,
            });
        }
        series
    }

    #[test]
    fn test_segments_split_on_setpoint_change() {
        let series = series_from(&[
            (10.0, 0.0, Saturation::None),
            (10.0, 6.0, Saturation::Upper),
            (10.0, 11.0, Saturation::None),
            (10.0, 10.0, Saturation::None),
            (0.0, 4.0, Saturation::Lower),
            (0.0, -1.5, Saturation::None),
        ]);
        let metrics = TrackingMetrics::from_series(&series);

        assert_eq!(metrics.segments.len(), 2);

        let rise = metrics.segments[0];
        assert_eq!((rise.start, rise.end), (0, 3));
        assert_relative_eq!(rise.peak_overshoot, 1.0);
        assert_relative_eq!(rise.final_error, 0.0);
        assert_eq!(rise.saturated_steps, 1);

        let brake = metrics.segments[1];
        assert_eq!((brake.start, brake.end), (4, 5));
        assert_relative_eq!(brake.peak_overshoot, 1.5);
        assert_relative_eq!(brake.final_error, 1.5);
        assert_eq!(brake.saturated_steps, 1);

        assert_eq!(metrics.saturated_steps, 2);
        assert_relative_eq!(metrics.max_abs_integral, 5.0);
        assert_eq!(metrics.worst_overshoot(), Some(&brake));
    }

    #[test]
    fn test_iae_weights_by_time_step() {
        let series = series_from(&[
            (2.0, 0.0, Saturation::None),
            (2.0, 1.0, Saturation::None),
            (2.0, 2.0, Saturation::None),
        ]);
        let metrics = TrackingMetrics::from_series(&series);

        // errors 2 and 1 over unit steps
        assert_relative_eq!(metrics.iae, 3.0);
    }

    #[test]
    fn test_no_overshoot_without_crossing() {
        let series = series_from(&[
            (5.0, 0.0, Saturation::None),
            (5.0, 3.0, Saturation::None),
            (5.0, 4.5, Saturation::None),
        ]);
        let metrics = TrackingMetrics::from_series(&series);

        assert_eq!(metrics.segments[0].peak_overshoot, 0.0);
        assert_eq!(metrics.worst_overshoot(), None);
    }

    #[test]
    fn test_empty_series() {
        let metrics = TrackingMetrics::from_series(&TimeSeries::default());
        assert!(metrics.segments.is_empty());
        assert_eq!(metrics.iae, 0.0);
    }
}
