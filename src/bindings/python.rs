use crate::acquisition::frame::Frame;
use crate::processing::sampler::{AggregationPolicy, SamplerConfig};
use crate::processing::session::{AnalysisSession, SessionConfig, SessionState};
use crate::processing::spectral::{self, AnalysisConfig};
use crate::regions::canvas::CanvasConfig;
use crate::regions::{Grab, Handle, RegionKind};

use std::collections::HashMap;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

#[pyclass]
pub struct PySession {
    session: AnalysisSession,
}

#[pymethods]
impl PySession {
    #[new]
    pub fn new(
        width: f64,
        height: f64,
        region_limit: usize,
        aggregation: String,
        verbose: bool,
    ) -> PyResult<Self> {
        let aggregation = match aggregation.as_str() {
            "sum" => AggregationPolicy::Sum,
            "mean" => AggregationPolicy::Mean,
            other => {
                return Err(PyValueError::new_err(format!(
                    "unknown aggregation '{}', expected 'sum' or 'mean'",
                    other
                )))
            }
        };
        let canvas = CanvasConfig {
            width,
            height,
            region_limit,
        };
        let sampler = SamplerConfig { aggregation };
        Ok(PySession {
            session: AnalysisSession::new(
                canvas,
                sampler,
                AnalysisConfig::default(),
                SessionConfig { verbose },
            ),
        })
    }

    pub fn add_region(&mut self, kind: String, x: f64, y: f64) -> PyResult<String> {
        let kind = RegionKind::parse(&kind).ok_or_else(|| {
            PyValueError::new_err(format!(
                "unknown region kind '{}', expected 'rectangle', 'ellipse' or 'line'",
                kind
            ))
        })?;
        self.session
            .add_region(kind, (x, y))
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    pub fn resize_region(&mut self, id: String, handle: String, x: f64, y: f64) -> PyResult<()> {
        let handle = Handle::parse(&handle)
            .ok_or_else(|| PyValueError::new_err(format!("unknown handle '{}'", handle)))?;
        self.session
            .resize_region(&id, handle, (x, y))
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    pub fn normalize_region(&mut self, id: String) -> PyResult<()> {
        self.session
            .normalize_region(&id)
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    pub fn move_region(&mut self, id: String, x: f64, y: f64) -> PyResult<()> {
        self.session
            .move_region(&id, (x, y))
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    pub fn focus_region(&mut self, id: String) -> PyResult<()> {
        self.session
            .focus_region(&id)
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    pub fn delete_region(&mut self, id: String) -> PyResult<()> {
        self.session
            .delete_region(&id)
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    /// Region id and grab target ("body" or a handle name) closest to a
    /// pointer position, if any region is grabbable there.
    pub fn nearest_region(&self, x: f64, y: f64) -> Option<(String, String)> {
        self.session.nearest_region((x, y)).map(|(id, grab)| {
            let target = match grab {
                Grab::Handle(handle) => handle.as_str().to_string(),
                Grab::Body => "body".to_string(),
            };
            (id, target)
        })
    }

    pub fn start(&mut self) {
        self.session.start();
    }

    pub fn stop(&mut self) {
        self.session.stop();
    }

    pub fn is_sampling(&self) -> bool {
        self.session.state() == SessionState::Sampling
    }

    pub fn rescale(&mut self, width: f64, height: f64) {
        self.session.rescale_all((width, height));
    }

    pub fn frames_processed(&self) -> u64 {
        self.session.frames_processed()
    }

    pub fn elapsed(&self) -> f64 {
        self.session.elapsed()
    }

    /// Feeds one frame (row-major pixel values) and returns the latest
    /// per-region value for every region that could be sampled.
    pub fn process_frame(
        &mut self,
        data: Vec<f64>,
        width: usize,
        height: usize,
    ) -> PyResult<HashMap<String, f64>> {
        let frame = Frame::from_vec(width, height, data).ok_or_else(|| {
            PyValueError::new_err("frame dimensions do not match the data length")
        })?;
        let mut latest = HashMap::new();
        if let Some(update) = self.session.process_frame(&frame) {
            for (id, snapshot) in update.regions {
                latest.insert(id, snapshot.values.last().copied().unwrap_or(0.0));
            }
        }
        Ok(latest)
    }

    pub fn get_series(&self, id: String) -> (Vec<f64>, Vec<f64>) {
        self.session.store().get(&id)
    }

    pub fn get_profile(&self, id: String) -> Option<Vec<f64>> {
        self.session
            .store()
            .latest_profile(&id)
            .map(|profile| profile.to_vec())
    }

    pub fn compute_fft(&self, id: String) -> Option<(Vec<f64>, Vec<f64>)> {
        self.session.compute_fft_for(&id)
    }

    pub fn detect_peaks(&self, id: String) -> Option<Vec<f64>> {
        self.session.detect_peaks_for(&id)
    }

    #[pyo3(signature = (min=None, max=None))]
    pub fn set_fft_window(&mut self, min: Option<f64>, max: Option<f64>) {
        self.session.set_fft_window(min, max);
    }
}

/// Period and frequency from two x positions spanning `peak_count` oscillations.
#[pyfunction]
pub fn calibrate(x1: f64, x2: f64, peak_count: usize) -> PyResult<(f64, f64)> {
    spectral::calibrate(x1, x2, peak_count).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// A Python module implemented in Rust.
#[pymodule]
pub fn rheed_live_analysis(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySession>()?;
    m.add_function(wrap_pyfunction!(calibrate, m)?)?;
    Ok(())
}
