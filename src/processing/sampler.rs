use std::collections::HashMap;
use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::acquisition::frame::Frame;
use crate::regions::canvas::RegionCanvas;
use crate::regions::mask::{line_points, RegionMask};
use crate::regions::region::Region;
use crate::regions::RegionKind;
use crate::utils::log::log_to_file;

/// How the pixel population under an area region reduces to one number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationPolicy {
    Sum,
    Mean,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SamplerConfig {
    pub aggregation: AggregationPolicy,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            aggregation: AggregationPolicy::Sum,
        }
    }
}

/// One region's extraction from one frame: the reduced scalar, plus the
/// ordered intensity profile for line regions.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSample {
    pub value: f64,
    pub profile: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipReason {
    ShapeMismatch,
    EmptyMask,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ShapeMismatch => write!(f, "viewport does not match frame size"),
            SkipReason::EmptyMask => write!(f, "mask covers no pixels"),
        }
    }
}

/// Extracts per-region samples from frames. Stateless apart from its
/// configuration; regions are sampled in parallel within a tick.
pub struct RegionSampler {
    config: SamplerConfig,
    verbose: bool,
}

impl RegionSampler {
    pub fn new(config: SamplerConfig, verbose: bool) -> Self {
        RegionSampler { config, verbose }
    }

    /// Samples every canvas region against `frame`. Regions that cannot be
    /// sampled (viewport/frame size mismatch, empty mask) are omitted from
    /// the result map; nothing here is an error.
    pub fn sample(&self, frame: &Frame, canvas: &RegionCanvas) -> HashMap<String, RegionSample> {
        let viewport = canvas.size();
        let results: Vec<(String, Result<RegionSample, SkipReason>)> = canvas
            .regions()
            .par_iter()
            .map(|region| {
                (
                    region.id.clone(),
                    self.sample_region(frame, viewport, region),
                )
            })
            .collect();

        let mut samples = HashMap::new();
        for (id, result) in results {
            match result {
                Ok(sample) => {
                    samples.insert(id, sample);
                }
                Err(reason) => {
                    if self.verbose {
                        let message = format!("region {} skipped: {}", id, reason);
                        log_to_file("sampler.log", &message)
                            .expect("Failed to write to log file");
                    }
                }
            }
        }
        samples
    }

    fn sample_region(
        &self,
        frame: &Frame,
        viewport: (f64, f64),
        region: &Region,
    ) -> Result<RegionSample, SkipReason> {
        if viewport.0 != frame.width() as f64 || viewport.1 != frame.height() as f64 {
            return Err(SkipReason::ShapeMismatch);
        }
        match region.kind {
            RegionKind::Line => {
                let points = line_points(region, frame.width(), frame.height());
                if points.is_empty() {
                    return Err(SkipReason::EmptyMask);
                }
                let profile: Vec<f64> = points.iter().map(|&(x, y)| frame.get(x, y)).collect();
                Ok(RegionSample {
                    value: self.reduce(profile.iter().sum(), profile.len()),
                    profile: Some(profile),
                })
            }
            _ => {
                let mask = RegionMask::for_region(region, frame.width(), frame.height());
                let count = mask.count();
                if count == 0 {
                    return Err(SkipReason::EmptyMask);
                }
                let data = frame.data();
                let total: f64 = mask.indices().map(|i| data[i]).sum();
                Ok(RegionSample {
                    value: self.reduce(total, count),
                    profile: None,
                })
            }
        }
    }

    fn reduce(&self, total: f64, count: usize) -> f64 {
        match self.config.aggregation {
            AggregationPolicy::Sum => total,
            AggregationPolicy::Mean => {
                if count == 0 {
                    0.0
                } else {
                    total / count as f64
                }
            }
        }
    }
}
