use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use super::MonitorConfig;
use crate::processing::session::SessionUpdate;

/// Rolling chart buffers fed from session updates.
///
/// The session's store owns the full history; this keeps only what a chart
/// would draw, bounded to `buffer_size` points per region. Readers get
/// copies, so a plot thread never holds the lock longer than a clone.
pub struct ChartMonitor {
    config: MonitorConfig,
    series: HashMap<String, VecDeque<(f64, f64)>>,
    profiles: HashMap<String, Vec<f64>>,
    peak_marks: HashMap<String, Vec<f64>>,
}

impl ChartMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            series: HashMap::new(),
            profiles: HashMap::new(),
            peak_marks: HashMap::new(),
        }
    }

    /// Appends the newest point of every region in `update`. A timestamp
    /// that jumps backwards means the series restarted; the stale tail for
    /// that region is dropped first.
    pub fn record_update(&mut self, update: &SessionUpdate) {
        for (id, snapshot) in &update.regions {
            if let (Some(&t), Some(&v)) = (snapshot.time.last(), snapshot.values.last()) {
                let buffer = self
                    .series
                    .entry(id.clone())
                    .or_insert_with(|| VecDeque::with_capacity(self.config.buffer_size));
                match buffer.back() {
                    Some(&(back, _)) if t == back => {}
                    Some(&(back, _)) if t < back => {
                        buffer.clear();
                        buffer.push_back((t, v));
                    }
                    _ => {
                        buffer.push_back((t, v));
                        if buffer.len() > self.config.buffer_size {
                            buffer.pop_front();
                        }
                    }
                }
            }
            if self.config.record_profiles {
                if let Some(profile) = &snapshot.profile {
                    self.profiles.insert(id.clone(), profile.clone());
                }
            }
        }
    }

    pub fn record_peaks(&mut self, id: &str, peaks: &[f64]) {
        self.peak_marks.insert(id.to_string(), peaks.to_vec());
    }

    pub fn get_series(&self, id: &str) -> Option<Vec<(f64, f64)>> {
        self.series
            .get(id)
            .map(|buffer| buffer.iter().copied().collect())
    }

    pub fn get_all_series(&self) -> HashMap<String, Vec<(f64, f64)>> {
        self.series
            .iter()
            .map(|(id, buffer)| (id.clone(), buffer.iter().copied().collect()))
            .collect()
    }

    pub fn latest_profile(&self, id: &str) -> Option<&[f64]> {
        self.profiles.get(id).map(|profile| profile.as_slice())
    }

    pub fn peaks(&self, id: &str) -> Option<&[f64]> {
        self.peak_marks.get(id).map(|peaks| peaks.as_slice())
    }

    /// The time span currently buffered, across every region.
    pub fn time_range(&self) -> Option<(f64, f64)> {
        let mut range: Option<(f64, f64)> = None;
        for buffer in self.series.values() {
            if let (Some(&(front, _)), Some(&(back, _))) = (buffer.front(), buffer.back()) {
                range = Some(match range {
                    Some((lo, hi)) => (lo.min(front), hi.max(back)),
                    None => (front, back),
                });
            }
        }
        range
    }

    pub fn clear(&mut self) {
        self.series.clear();
        self.profiles.clear();
        self.peak_marks.clear();
    }
}

pub type SharedChartMonitor = Arc<Mutex<ChartMonitor>>;

pub fn create_shared_monitor(config: MonitorConfig) -> SharedChartMonitor {
    Arc::new(Mutex::new(ChartMonitor::new(config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::session::RegionSnapshot;
    use crate::regions::RegionKind;

    fn update_with(id: &str, time: Vec<f64>, values: Vec<f64>) -> SessionUpdate {
        let elapsed = time.last().copied().unwrap_or(0.0);
        let mut regions = HashMap::new();
        regions.insert(
            id.to_string(),
            RegionSnapshot {
                kind: RegionKind::Rectangle,
                time,
                values,
                profile: None,
                scan: None,
            },
        );
        SessionUpdate {
            frame_index: 0,
            elapsed,
            regions,
        }
    }

    #[test]
    fn only_the_newest_point_is_appended() {
        let mut monitor = ChartMonitor::new(MonitorConfig::default());
        monitor.record_update(&update_with("cyan", vec![0.0], vec![1.0]));
        monitor.record_update(&update_with("cyan", vec![0.0, 0.1], vec![1.0, 2.0]));
        // A repeated timestamp is the same tick seen twice.
        monitor.record_update(&update_with("cyan", vec![0.0, 0.1], vec![1.0, 2.0]));
        assert_eq!(
            monitor.get_series("cyan").unwrap(),
            vec![(0.0, 1.0), (0.1, 2.0)]
        );
    }

    #[test]
    fn capacity_front_pops_oldest_points() {
        let mut monitor = ChartMonitor::new(MonitorConfig {
            buffer_size: 3,
            record_profiles: true,
        });
        for i in 0..5 {
            let t = i as f64;
            monitor.record_update(&update_with("cyan", vec![t], vec![t * 10.0]));
        }
        let series = monitor.get_series("cyan").unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series[0], (2.0, 20.0));
        assert_eq!(series[2], (4.0, 40.0));
    }

    #[test]
    fn backwards_time_restarts_the_buffer() {
        let mut monitor = ChartMonitor::new(MonitorConfig::default());
        for i in 0..3 {
            let t = i as f64;
            monitor.record_update(&update_with("cyan", vec![t], vec![t]));
        }
        monitor.record_update(&update_with("cyan", vec![0.5], vec![9.0]));
        assert_eq!(monitor.get_series("cyan").unwrap(), vec![(0.5, 9.0)]);
    }

    #[test]
    fn profiles_follow_the_config_switch() {
        let mut update = update_with("lime", vec![0.0], vec![3.0]);
        if let Some(snapshot) = update.regions.get_mut("lime") {
            snapshot.kind = RegionKind::Line;
            snapshot.profile = Some(vec![1.0, 2.0]);
        }

        let mut recording = ChartMonitor::new(MonitorConfig::default());
        recording.record_update(&update);
        assert_eq!(recording.latest_profile("lime"), Some([1.0, 2.0].as_slice()));

        let mut skipping = ChartMonitor::new(MonitorConfig {
            buffer_size: 5000,
            record_profiles: false,
        });
        skipping.record_update(&update);
        assert!(skipping.latest_profile("lime").is_none());
    }

    #[test]
    fn time_range_spans_every_region() {
        let mut monitor = ChartMonitor::new(MonitorConfig::default());
        assert!(monitor.time_range().is_none());
        monitor.record_update(&update_with("cyan", vec![0.0], vec![1.0]));
        monitor.record_update(&update_with("cyan", vec![0.0, 2.0], vec![1.0, 1.0]));
        monitor.record_update(&update_with("magenta", vec![1.0], vec![1.0]));
        monitor.record_update(&update_with("magenta", vec![1.0, 5.0], vec![1.0, 1.0]));
        assert_eq!(monitor.time_range(), Some((0.0, 5.0)));
    }

    #[test]
    fn peaks_are_recorded_per_region() {
        let mut monitor = ChartMonitor::new(MonitorConfig::default());
        monitor.record_peaks("cyan", &[1.5, 3.0]);
        assert_eq!(monitor.peaks("cyan"), Some([1.5, 3.0].as_slice()));
        monitor.clear();
        assert!(monitor.peaks("cyan").is_none());
    }
}
