use std::collections::HashMap;

use super::linescan::LineScanImage;
use super::sampler::RegionSample;
use super::snip_pair;
use crate::regions::RegionKind;

/// Rolling measurement history for one region. Timestamps are seconds since
/// this region's own origin, so a region added mid-run starts at zero like
/// any other. Buffers grow until the owning store clears them.
#[derive(Debug, Clone)]
pub struct RegionSeries {
    kind: RegionKind,
    origin: f64,
    time: Vec<f64>,
    values: Vec<f64>,
    profiles: Vec<Vec<f64>>,
    scan: Option<LineScanImage>,
}

impl RegionSeries {
    fn new(kind: RegionKind, origin: f64) -> Self {
        RegionSeries {
            kind,
            origin,
            time: Vec::new(),
            values: Vec::new(),
            profiles: Vec::new(),
            scan: None,
        }
    }

    fn append(&mut self, now: f64, sample: &RegionSample) {
        self.time.push(now - self.origin);
        self.values.push(sample.value);
        if let Some(profile) = &sample.profile {
            self.profiles.push(profile.clone());
            match &mut self.scan {
                Some(scan) => {
                    scan.push(profile);
                }
                None => self.scan = Some(LineScanImage::seed(profile)),
            }
        }
    }
}

/// Per-region series buffers, keyed by region id. Owned by the session;
/// entries are created and removed in the same transaction as their regions.
#[derive(Debug, Default)]
pub struct SeriesStore {
    series: HashMap<String, RegionSeries>,
}

impl SeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the region's history over with a fresh origin.
    pub fn reset(&mut self, id: &str, kind: RegionKind, now: f64) {
        self.series
            .insert(id.to_string(), RegionSeries::new(kind, now));
    }

    /// Records one sample at session time `now`. Unknown ids are ignored;
    /// entries exist exactly as long as their regions do.
    pub fn append(&mut self, id: &str, now: f64, sample: &RegionSample) {
        if let Some(series) = self.series.get_mut(id) {
            series.append(now, sample);
        }
    }

    /// The (time, values) pair for a region, truncated to a common length.
    /// Unknown ids yield empty sequences.
    pub fn get(&self, id: &str) -> (Vec<f64>, Vec<f64>) {
        match self.series.get(id) {
            Some(series) => snip_pair(&series.time, &series.values),
            None => (Vec::new(), Vec::new()),
        }
    }

    pub fn kind(&self, id: &str) -> Option<RegionKind> {
        self.series.get(id).map(|series| series.kind)
    }

    pub fn latest_profile(&self, id: &str) -> Option<&[f64]> {
        self.series
            .get(id)
            .and_then(|series| series.profiles.last())
            .map(|profile| profile.as_slice())
    }

    pub fn profiles(&self, id: &str) -> Option<&[Vec<f64>]> {
        self.series.get(id).map(|series| series.profiles.as_slice())
    }

    pub fn scan(&self, id: &str) -> Option<&LineScanImage> {
        self.series.get(id).and_then(|series| series.scan.as_ref())
    }

    pub fn remove(&mut self, id: &str) {
        self.series.remove(id);
    }

    pub fn clear(&mut self) {
        self.series.clear();
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.series.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(value: f64) -> RegionSample {
        RegionSample {
            value,
            profile: None,
        }
    }

    fn profile(values: &[f64]) -> RegionSample {
        RegionSample {
            value: values.iter().sum(),
            profile: Some(values.to_vec()),
        }
    }

    #[test]
    fn time_is_relative_to_the_region_origin() {
        let mut store = SeriesStore::new();
        store.reset("cyan", RegionKind::Rectangle, 10.0);
        store.append("cyan", 10.0, &scalar(1.0));
        store.append("cyan", 10.5, &scalar(2.0));
        let (time, values) = store.get("cyan");
        assert_eq!(time, vec![0.0, 0.5]);
        assert_eq!(values, vec![1.0, 2.0]);
    }

    #[test]
    fn unknown_id_yields_empty_sequences() {
        let store = SeriesStore::new();
        let (time, values) = store.get("nope");
        assert!(time.is_empty());
        assert!(values.is_empty());
        assert!(store.latest_profile("nope").is_none());
    }

    #[test]
    fn append_without_reset_is_ignored() {
        let mut store = SeriesStore::new();
        store.append("cyan", 1.0, &scalar(1.0));
        assert!(store.get("cyan").0.is_empty());
    }

    #[test]
    fn reset_clears_history_and_reorigins() {
        let mut store = SeriesStore::new();
        store.reset("cyan", RegionKind::Rectangle, 0.0);
        store.append("cyan", 1.0, &scalar(1.0));
        store.reset("cyan", RegionKind::Rectangle, 5.0);
        store.append("cyan", 5.25, &scalar(9.0));
        let (time, values) = store.get("cyan");
        assert_eq!(time, vec![0.25]);
        assert_eq!(values, vec![9.0]);
    }

    #[test]
    fn line_samples_build_profiles_and_scan() {
        let mut store = SeriesStore::new();
        store.reset("lime", RegionKind::Line, 0.0);
        store.append("lime", 0.0, &profile(&[1.0, 2.0]));
        store.append("lime", 0.1, &profile(&[3.0, 4.0]));
        assert_eq!(store.profiles("lime").unwrap().len(), 2);
        assert_eq!(store.latest_profile("lime"), Some([3.0, 4.0].as_slice()));
        let scan = store.scan("lime").unwrap();
        assert_eq!(scan.width(), 2);
        assert_eq!(scan.height(), 2);

        // A resized line reseeds the scan but keeps the profile history.
        store.append("lime", 0.2, &profile(&[5.0, 6.0, 7.0]));
        assert_eq!(store.scan("lime").unwrap().width(), 1);
        assert_eq!(store.profiles("lime").unwrap().len(), 3);
    }

    #[test]
    fn remove_drops_the_entry() {
        let mut store = SeriesStore::new();
        store.reset("cyan", RegionKind::Ellipse, 0.0);
        store.append("cyan", 0.5, &scalar(2.0));
        store.remove("cyan");
        assert!(store.is_empty());
        assert!(store.get("cyan").0.is_empty());
    }
}
