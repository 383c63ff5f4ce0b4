//! Time-series record of a simulation run
//!
//! Parallel, equal-length sequences indexed by the shared time grid. Index 0
//! holds the initial conditions: the step-0 setpoint, the initial velocity,
//! the error between them, the initial accumulator, a zero command and no
//! saturation. The outcome of step `k` is stored at index `k + 1`, the time
//! point at which that step ends, so `error[k + 1]` is measured against
//! `velocity[k]`, the velocity the controller saw when the step began.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::controller::Saturation;
use crate::error::SimResult;

/// One row of a [`TimeSeries`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: f64,
    pub setpoint: f64,
    pub velocity: f64,
    pub error: f64,
    pub integral: f64,
    pub command: f64,
    pub saturation: Saturation,
}

/// Recorded series of a completed run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Time points (s)
    pub time: Vec<f64>,
    /// Target velocity in effect (m/s)
    pub setpoint: Vec<f64>,
    /// Plant velocity (m/s)
    pub velocity: Vec<f64>,
    /// Tracking error the controller acted on (m/s)
    pub error: Vec<f64>,
    /// Integral-of-error accumulator after the step (m)
    pub integral: Vec<f64>,
    /// Clamped actuator command applied over the step (%)
    pub command: Vec<f64>,
    /// Which bound, if any, clamped the command
    pub saturation: Vec<Saturation>,
}

impl TimeSeries {
    /// Empty series with room for `capacity` samples per sequence
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            time: Vec::with_capacity(capacity),
            setpoint: Vec::with_capacity(capacity),
            velocity: Vec::with_capacity(capacity),
            error: Vec::with_capacity(capacity),
            integral: Vec::with_capacity(capacity),
            command: Vec::with_capacity(capacity),
            saturation: Vec::with_capacity(capacity),
        }
    }

    /// Append one row to every sequence
    pub fn push(&mut self, sample: Sample) {
        self.time.push(sample.time);
        self.setpoint.push(sample.setpoint);
        self.velocity.push(sample.velocity);
        self.error.push(sample.error);
        self.integral.push(sample.integral);
        self.command.push(sample.command);
        self.saturation.push(sample.saturation);
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Row at `index`, if present
    pub fn get(&self, index: usize) -> Option<Sample> {
        if index >= self.len() {
            return None;
        }
        Some(Sample {
            time: self.time[index],
            setpoint: self.setpoint[index],
            velocity: self.velocity[index],
            error: self.error[index],
            integral: self.integral[index],
            command: self.command[index],
            saturation: self.saturation[index],
        })
    }

    /// Iterate over rows in time order
    pub fn iter(&self) -> impl Iterator<Item = Sample> + '_ {
        (0..self.len()).filter_map(move |index| self.get(index))
    }

    /// Final recorded row
    pub fn last(&self) -> Option<Sample> {
        self.len().checked_sub(1).and_then(|index| self.get(index))
    }

    /// Write all rows as CSV with a header line
    pub fn write_csv<W: Write>(&self, writer: W) -> SimResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for sample in self.iter() {
            wtr.serialize(sample)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Export all rows to a CSV file
    pub fn export_csv(&self, path: &Path) -> SimResult<()> {
        let file = std::fs::File::create(path)?;
        self.write_csv(std::io::BufWriter::new(file))
    }

    /// Serialize the parallel sequences as pretty-printed JSON
    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Export the parallel sequences to a JSON file
    pub fn export_json(&self, path: &Path) -> SimResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(time: f64) -> Sample {
        Sample {
            time,
            setpoint: 25.0,
            velocity: time * 2.0,
            error: 25.0 - time * 2.0,
            integral: time,
            command: 100.0,
            saturation: Saturation::Upper,
        }
    }

    #[test]
    fn test_push_keeps_sequences_aligned() {
        let mut series = TimeSeries::with_capacity(3);
        series.push(sample(0.0));
        series.push(sample(1.0));

        assert_eq!(series.len(), 2);
        assert_eq!(series.velocity, vec![0.0, 2.0]);
        assert_eq!(series.saturation.len(), 2);
        assert_eq!(series.get(1), Some(sample(1.0)));
        assert_eq!(series.get(2), None);
        assert_eq!(series.last(), Some(sample(1.0)));
    }

    #[test]
    fn test_csv_layout() {
        let mut series = TimeSeries::default();
        series.push(sample(0.0));
        series.push(sample(1.0));

        let mut buffer = Vec::new();
        series.write_csv(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next(),
            Some("time,setpoint,velocity,error,integral,command,saturation")
        );
        assert_eq!(lines.next(), Some("0.0,25.0,0.0,25.0,0.0,100.0,upper"));
        assert_eq!(lines.count(), 1);
    }

    #[test]
    fn test_json_export_to_file() {
        let mut series = TimeSeries::default();
        series.push(sample(0.0));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.json");
        series.export_json(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: TimeSeries = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, series);
    }

    #[test]
    fn test_empty_series() {
        let series = TimeSeries::default();
        assert!(series.is_empty());
        assert_eq!(series.last(), None);
        assert_eq!(series.iter().count(), 0);
    }
}
