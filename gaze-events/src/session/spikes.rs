//! Spike units
//!
//! One record per sorted unit, carrying its timestamps in seconds and
//! milliseconds plus the label fields reported in the unit table.

use serde::{Deserialize, Serialize};

/// A sorted neural unit and its spike times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpikeUnit {
    pub session_name: String,
    pub channel: String,
    pub channel_label: String,
    /// Unit number within the channel
    pub unit: u32,
    pub unit_label: String,
    pub uuid: String,
    pub region: String,
    pub spike_s: Vec<f64>,
    pub spike_ms: Vec<f64>,
}

impl SpikeUnit {
    pub fn n_spikes(&self) -> usize {
        self.spike_s.len()
    }

    /// Spikes with `t0 < t <= t1`, seconds.
    pub fn count_in(&self, t0: f64, t1: f64) -> usize {
        self.spike_s.iter().filter(|&&t| t > t0 && t <= t1).count()
    }

    pub fn label(&self) -> SpikeUnitLabel {
        SpikeUnitLabel {
            session_name: self.session_name.clone(),
            channel: self.channel.clone(),
            channel_label: self.channel_label.clone(),
            unit_no_in_channel: self.unit,
            unit_label: self.unit_label.clone(),
            uuid: self.uuid.clone(),
            n_spikes: self.n_spikes(),
            region: self.region.clone(),
        }
    }
}

/// Row of the spike-unit label table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpikeUnitLabel {
    pub session_name: String,
    pub channel: String,
    pub channel_label: String,
    pub unit_no_in_channel: u32,
    pub unit_label: String,
    pub uuid: String,
    pub n_spikes: usize,
    pub region: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(spikes: Vec<f64>) -> SpikeUnit {
        SpikeUnit {
            session_name: "01022019".to_string(),
            channel: "WB01".to_string(),
            channel_label: "ch1".to_string(),
            unit: 2,
            unit_label: "b".to_string(),
            uuid: "0a1b".to_string(),
            region: "acc".to_string(),
            spike_ms: spikes.iter().map(|s| s * 1000.0).collect(),
            spike_s: spikes,
        }
    }

    #[test]
    fn test_count_in_window() {
        let u = unit(vec![0.5, 1.0, 1.5, 2.0, 2.5]);
        assert_eq!(u.count_in(1.0, 2.0), 2);
        assert_eq!(u.count_in(0.0, 10.0), 5);
        assert_eq!(u.count_in(3.0, 4.0), 0);
    }

    #[test]
    fn test_label_fields() {
        let label = unit(vec![0.1, 0.2, 0.3]).label();
        assert_eq!(label.n_spikes, 3);
        assert_eq!(label.unit_no_in_channel, 2);
        assert_eq!(label.region, "acc");
        assert_eq!(label.session_name, "01022019");
    }

    #[test]
    fn test_empty_unit() {
        let u = unit(vec![]);
        assert_eq!(u.n_spikes(), 0);
        assert_eq!(u.count_in(0.0, 1.0), 0);
    }
}
