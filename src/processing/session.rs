use std::collections::HashMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::linescan::LineScanImage;
use super::sampler::{RegionSampler, SamplerConfig};
use super::series::SeriesStore;
use super::spectral::{self, AnalysisConfig};
use crate::acquisition::frame::Frame;
use crate::regions::canvas::{CanvasConfig, RegionCanvas};
use crate::regions::{Grab, Handle, RegionError, RegionKind};
use crate::utils::log::log_to_file;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionConfig {
    pub verbose: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { verbose: false }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Sampling,
}

/// Per-region view handed to display observers each tick.
#[derive(Debug, Clone)]
pub struct RegionSnapshot {
    pub kind: RegionKind,
    pub time: Vec<f64>,
    pub values: Vec<f64>,
    pub profile: Option<Vec<f64>>,
    pub scan: Option<LineScanImage>,
}

#[derive(Debug, Clone)]
pub struct SessionUpdate {
    pub frame_index: u64,
    pub elapsed: f64,
    pub regions: HashMap<String, RegionSnapshot>,
}

/// Owns the canvas and series store and drives the measurement loop.
///
/// The session is Idle until the first region lands on an empty canvas, then
/// samples every frame it is handed. Stopping keeps the collected series
/// around for inspection; they are discarded the next time sampling starts.
/// The session never touches the frame producer, so stopping one side never
/// stalls the other.
pub struct AnalysisSession {
    canvas: RegionCanvas,
    sampler: RegionSampler,
    store: SeriesStore,
    analysis: AnalysisConfig,
    state: SessionState,
    clock: Option<Instant>,
    frame_index: u64,
    verbose: bool,
}

impl AnalysisSession {
    pub fn new(
        canvas: CanvasConfig,
        sampler: SamplerConfig,
        analysis: AnalysisConfig,
        session: SessionConfig,
    ) -> Self {
        AnalysisSession {
            canvas: RegionCanvas::new(&canvas),
            sampler: RegionSampler::new(sampler, session.verbose),
            store: SeriesStore::new(),
            analysis,
            state: SessionState::Idle,
            clock: None,
            frame_index: 0,
            verbose: session.verbose,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn canvas(&self) -> &RegionCanvas {
        &self.canvas
    }

    pub fn store(&self) -> &SeriesStore {
        &self.store
    }

    pub fn frames_processed(&self) -> u64 {
        self.frame_index
    }

    /// Seconds since sampling started; zero while Idle.
    pub fn elapsed(&self) -> f64 {
        self.clock
            .map(|clock| clock.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Adds a region. The first region on an empty canvas starts sampling;
    /// a region added mid-run gets its own fresh series origin.
    pub fn add_region(
        &mut self,
        kind: RegionKind,
        point: (f64, f64),
    ) -> Result<String, RegionError> {
        let was_empty = self.canvas.is_empty();
        let id = self.canvas.add_region(kind, point)?;
        match self.state {
            SessionState::Sampling => {
                self.store.reset(&id, kind, self.elapsed());
            }
            SessionState::Idle => {
                if was_empty {
                    self.enter_sampling();
                }
                // Stopped with regions retained: stay Idle until start().
            }
        }
        Ok(id)
    }

    /// Deletes a region and its series together. Removing the last region
    /// stops the session.
    pub fn delete_region(&mut self, id: &str) -> Result<(), RegionError> {
        let removed = self.canvas.delete_region(id)?;
        self.store.remove(&removed.id);
        if self.canvas.is_empty() {
            self.stop();
        }
        Ok(())
    }

    /// Starts sampling. No-op while already Sampling or with nothing to
    /// sample; an empty canvas is a reason to stay Idle, not an error.
    pub fn start(&mut self) {
        if self.state == SessionState::Sampling || self.canvas.is_empty() {
            return;
        }
        self.enter_sampling();
    }

    /// Stops sampling, keeping the buffers. Idempotent.
    pub fn stop(&mut self) {
        self.state = SessionState::Idle;
        self.clock = None;
    }

    fn enter_sampling(&mut self) {
        self.clock = Some(Instant::now());
        self.store.clear();
        let entries: Vec<(String, RegionKind)> = self
            .canvas
            .regions()
            .iter()
            .map(|region| (region.id.clone(), region.kind))
            .collect();
        for (id, kind) in entries {
            self.store.reset(&id, kind, 0.0);
        }
        self.state = SessionState::Sampling;
        self.frame_index = 0;
        if self.verbose {
            let message = format!("sampling started with {} regions", self.canvas.len());
            log_to_file("session.log", &message).expect("Failed to write to log file");
        }
    }

    /// Feeds one frame through sample → append → snapshot. Returns `None`
    /// while Idle; regions that could not be sampled are simply absent from
    /// the update.
    pub fn process_frame(&mut self, frame: &Frame) -> Option<SessionUpdate> {
        if self.state != SessionState::Sampling || self.canvas.is_empty() {
            return None;
        }
        let now = self.elapsed();
        let samples = self.sampler.sample(frame, &self.canvas);
        for (id, sample) in &samples {
            self.store.append(id, now, sample);
        }
        self.frame_index += 1;
        if self.verbose {
            let message = format!(
                "frame {} at {:.3}s: {} of {} regions sampled",
                self.frame_index,
                now,
                samples.len(),
                self.canvas.len()
            );
            log_to_file("session.log", &message).expect("Failed to write to log file");
        }

        let mut regions = HashMap::new();
        for region in self.canvas.regions() {
            if !samples.contains_key(&region.id) {
                continue;
            }
            let (time, values) = self.store.get(&region.id);
            regions.insert(
                region.id.clone(),
                RegionSnapshot {
                    kind: region.kind,
                    time,
                    values,
                    profile: self
                        .store
                        .latest_profile(&region.id)
                        .map(|profile| profile.to_vec()),
                    scan: self.store.scan(&region.id).cloned(),
                },
            );
        }
        Some(SessionUpdate {
            frame_index: self.frame_index,
            elapsed: now,
            regions,
        })
    }

    /// Spectrum of a region's series, restricted to the configured FFT time
    /// window first.
    pub fn compute_fft_for(&self, id: &str) -> Option<(Vec<f64>, Vec<f64>)> {
        let (time, values) = self.store.get(id);
        let (time, values) = spectral::apply_cutoffs(
            &time,
            &values,
            self.analysis.fft_window_min,
            self.analysis.fft_window_max,
        );
        spectral::compute_fft(&time, &values)
    }

    pub fn detect_peaks_for(&self, id: &str) -> Option<Vec<f64>> {
        let (freqs, psd) = self.compute_fft_for(id)?;
        spectral::detect_peaks(
            &freqs,
            &psd,
            self.analysis.min_peak_frequency,
            self.analysis.peak_height_floor,
            self.analysis.min_peak_distance,
        )
    }

    pub fn set_fft_window(&mut self, min: Option<f64>, max: Option<f64>) {
        self.analysis.fft_window_min = min;
        self.analysis.fft_window_max = max;
    }

    // Geometry passthroughs, so interaction layers talk to one object.

    pub fn resize_region(
        &mut self,
        id: &str,
        handle: Handle,
        point: (f64, f64),
    ) -> Result<(), RegionError> {
        self.canvas.resize_region(id, handle, point)
    }

    pub fn normalize_region(&mut self, id: &str) -> Result<(), RegionError> {
        self.canvas.normalize_region(id)
    }

    pub fn move_region(&mut self, id: &str, top_left: (f64, f64)) -> Result<(), RegionError> {
        self.canvas.move_region(id, top_left)
    }

    pub fn focus_region(&mut self, id: &str) -> Result<(), RegionError> {
        self.canvas.focus_region(id)
    }

    pub fn rescale_all(&mut self, new_size: (f64, f64)) {
        self.canvas.rescale_all(new_size);
    }

    pub fn nearest_region(&self, point: (f64, f64)) -> Option<(String, Grab)> {
        self.canvas.nearest_region(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_100() -> AnalysisSession {
        AnalysisSession::new(
            CanvasConfig {
                width: 100.0,
                height: 100.0,
                region_limit: 6,
            },
            SamplerConfig::default(),
            AnalysisConfig::default(),
            SessionConfig::default(),
        )
    }

    fn frame_with_box(fill: f64) -> Frame {
        let mut data = vec![0.0; 100 * 100];
        for y in 0..10 {
            for x in 0..10 {
                data[y * 100 + x] = fill;
            }
        }
        Frame::from_vec(100, 100, data).unwrap()
    }

    fn add_box_region(session: &mut AnalysisSession) -> String {
        let id = session
            .add_region(RegionKind::Rectangle, (0.0, 0.0))
            .unwrap();
        session
            .resize_region(&id, Handle::BottomRight, (9.0, 9.0))
            .unwrap();
        id
    }

    #[test]
    fn zero_region_session_never_samples() {
        let mut session = session_100();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.process_frame(&frame_with_box(5.0)).is_none());
        session.start();
        assert_eq!(session.state(), SessionState::Idle);
        let (time, values) = session.store().get("cyan");
        assert!(time.is_empty());
        assert!(values.is_empty());
    }

    #[test]
    fn box_sum_goes_from_zero_to_five_hundred() {
        let mut session = session_100();
        let id = add_box_region(&mut session);
        assert_eq!(session.state(), SessionState::Sampling);

        let first = session.process_frame(&frame_with_box(0.0)).unwrap();
        assert_eq!(first.regions[&id].values, vec![0.0]);

        let second = session.process_frame(&frame_with_box(5.0)).unwrap();
        assert_eq!(second.regions[&id].values, vec![0.0, 500.0]);
        assert_eq!(second.frame_index, 2);
    }

    #[test]
    fn stop_retains_buffers_and_restart_clears_them() {
        let mut session = session_100();
        let id = add_box_region(&mut session);
        session.process_frame(&frame_with_box(1.0));
        session.process_frame(&frame_with_box(2.0));
        assert_eq!(session.store().get(&id).1.len(), 2);

        session.stop();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.process_frame(&frame_with_box(3.0)).is_none());
        assert_eq!(session.store().get(&id).1.len(), 2);
        session.stop();
        assert_eq!(session.state(), SessionState::Idle);

        session.start();
        assert_eq!(session.state(), SessionState::Sampling);
        assert!(session.store().get(&id).1.is_empty());
        session.process_frame(&frame_with_box(4.0));
        assert_eq!(session.store().get(&id).1.len(), 1);
    }

    #[test]
    fn region_added_mid_run_starts_its_own_series() {
        let mut session = session_100();
        let first = add_box_region(&mut session);
        for _ in 0..3 {
            session.process_frame(&frame_with_box(1.0));
        }
        let second = session
            .add_region(RegionKind::Rectangle, (20.0, 20.0))
            .unwrap();
        session
            .resize_region(&second, Handle::BottomRight, (29.0, 29.0))
            .unwrap();
        for _ in 0..2 {
            session.process_frame(&frame_with_box(1.0));
        }
        assert_eq!(session.store().get(&first).1.len(), 5);
        let (time, values) = session.store().get(&second);
        assert_eq!(values.len(), 2);
        assert!(time[0] >= 0.0 && time[0] < 1.0);
    }

    #[test]
    fn deleting_the_last_region_stops_the_session() {
        let mut session = session_100();
        let id = add_box_region(&mut session);
        session.process_frame(&frame_with_box(1.0));
        session.delete_region(&id).unwrap();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.store().is_empty());
    }

    #[test]
    fn mismatched_frame_produces_an_empty_update() {
        let mut session = session_100();
        let id = add_box_region(&mut session);
        let frame = Frame::from_vec(10, 10, vec![1.0; 100]).unwrap();
        let update = session.process_frame(&frame).unwrap();
        assert!(update.regions.is_empty());
        assert!(session.store().get(&id).1.is_empty());
    }

    #[test]
    fn spectral_queries_fail_soft_on_missing_series() {
        let session = session_100();
        assert!(session.compute_fft_for("cyan").is_none());
        assert!(session.detect_peaks_for("cyan").is_none());
    }

    #[test]
    fn line_regions_surface_profile_and_scan() {
        let mut session = session_100();
        let id = session.add_region(RegionKind::Line, (0.0, 50.0)).unwrap();
        session
            .resize_region(&id, Handle::LineEnd, (10.0, 50.0))
            .unwrap();
        let update = session.process_frame(&frame_with_box(0.0)).unwrap();
        let snapshot = &update.regions[&id];
        assert_eq!(snapshot.kind, RegionKind::Line);
        assert_eq!(snapshot.profile.as_ref().unwrap().len(), 10);
        assert_eq!(snapshot.scan.as_ref().unwrap().width(), 1);
    }
}
