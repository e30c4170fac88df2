use std::f64::consts::PI;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::frame::{Frame, FrameCapture};
use super::{FrameSource, SourceDiagnostics, SourceError, SourceStats};

const BACKGROUND_LEVEL: f64 = 20.0;
const SPOT_LEVEL: f64 = 150.0;
const SPOT_SWING: f64 = 100.0;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SourceConfig {
    pub width: usize,
    pub height: usize,
    pub frame_rate: f64,
    pub oscillation_hz: f64,
    pub noise_amplitude: f64,
    pub incomplete_chance: f64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            frame_rate: 30.0,
            oscillation_hz: 2.0,
            noise_amplitude: 5.0,
            incomplete_chance: 0.02,
        }
    }
}

/// Camera stand-in producing a noisy background with a central disc whose
/// brightness oscillates at a configurable rate, the shape a specular spot
/// takes during layer-by-layer growth. Frame timestamps advance by the
/// nominal frame interval per grab, so the stream is usable at any real
/// polling rate.
pub struct SyntheticCamera {
    config: SourceConfig,
    diagnostics: SourceDiagnostics,
    running: bool,
    time: f64,
}

impl SyntheticCamera {
    pub fn new(config: SourceConfig) -> Result<Self, SourceError> {
        if config.width == 0 || config.height == 0 {
            return Err(SourceError::CameraUnavailable(
                "frame dimensions must be nonzero".to_string(),
            ));
        }
        if config.frame_rate <= 0.0 {
            return Err(SourceError::CameraUnavailable(
                "frame rate must be positive".to_string(),
            ));
        }
        Ok(SyntheticCamera {
            config,
            diagnostics: SourceDiagnostics::new(),
            running: false,
            time: 0.0,
        })
    }

    fn render(&self, t: f64) -> Frame {
        let (w, h) = (self.config.width, self.config.height);
        let noise = self.config.noise_amplitude;
        let mut rng = rand::thread_rng();
        let mut data = vec![BACKGROUND_LEVEL; w * h];
        if noise > 0.0 {
            for value in data.iter_mut() {
                *value += rng.gen_range(-noise..noise);
            }
        }

        let cx = w as f64 / 2.0;
        let cy = h as f64 / 2.0;
        let radius = w.min(h) as f64 / 8.0;
        let spot = SPOT_LEVEL + SPOT_SWING * (2.0 * PI * self.config.oscillation_hz * t).sin();
        let x_min = (cx - radius).max(0.0) as usize;
        let x_max = ((cx + radius) as usize).min(w - 1);
        let y_min = (cy - radius).max(0.0) as usize;
        let y_max = ((cy + radius) as usize).min(h - 1);
        for y in y_min..=y_max {
            for x in x_min..=x_max {
                let dx = x as f64 - cx;
                let dy = y as f64 - cy;
                if dx * dx + dy * dy <= radius * radius {
                    data[y * w + x] = if noise > 0.0 {
                        spot + rng.gen_range(-noise..noise)
                    } else {
                        spot
                    };
                }
            }
        }
        Frame::from_raw(w, h, data)
    }
}

impl FrameSource for SyntheticCamera {
    fn start(&mut self) -> Result<(), SourceError> {
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.running = false;
        self.diagnostics.reset();
    }

    fn grab_frame(&mut self) -> Result<Option<FrameCapture>, SourceError> {
        if !self.running {
            return Ok(None);
        }
        let t = self.time;
        self.time += 1.0 / self.config.frame_rate;
        let frame = self.render(t);
        let chance = self.config.incomplete_chance.clamp(0.0, 1.0);
        let complete = chance <= 0.0 || !rand::thread_rng().gen_bool(chance);
        self.diagnostics.record_frame(complete);
        Ok(Some(FrameCapture { frame, complete }))
    }

    fn width(&self) -> usize {
        self.config.width
    }

    fn height(&self) -> usize {
        self.config.height
    }

    fn stats(&self) -> SourceStats {
        self.diagnostics.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config() -> SourceConfig {
        SourceConfig {
            width: 64,
            height: 48,
            frame_rate: 4.0,
            oscillation_hz: 1.0,
            noise_amplitude: 0.0,
            incomplete_chance: 0.0,
        }
    }

    #[test]
    fn not_started_yields_no_frames() {
        let mut camera = SyntheticCamera::new(quiet_config()).unwrap();
        assert_eq!(camera.grab_frame().unwrap(), None);
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let config = SourceConfig {
            width: 0,
            ..quiet_config()
        };
        assert!(matches!(
            SyntheticCamera::new(config),
            Err(SourceError::CameraUnavailable(_))
        ));
    }

    #[test]
    fn frames_match_configured_dimensions() {
        let mut camera = SyntheticCamera::new(quiet_config()).unwrap();
        camera.start().unwrap();
        let capture = camera.grab_frame().unwrap().unwrap();
        assert_eq!(capture.frame.width(), 64);
        assert_eq!(capture.frame.height(), 48);
        assert!(capture.complete);
    }

    #[test]
    fn spot_is_brighter_than_background_and_oscillates() {
        let mut camera = SyntheticCamera::new(quiet_config()).unwrap();
        camera.start().unwrap();
        // t = 0 (sin = 0), then t = 0.25 s (sin = 1) at 4 fps and 1 Hz.
        let first = camera.grab_frame().unwrap().unwrap().frame;
        let second = camera.grab_frame().unwrap().unwrap().frame;
        let center = (32, 24);
        assert!(first.get(center.0, center.1) > first.get(0, 0));
        assert!(second.get(center.0, center.1) > first.get(center.0, center.1));
    }

    #[test]
    fn stop_clears_diagnostics() {
        let mut camera = SyntheticCamera::new(SourceConfig {
            incomplete_chance: 1.0,
            ..quiet_config()
        })
        .unwrap();
        camera.start().unwrap();
        for _ in 0..5 {
            camera.grab_frame().unwrap();
        }
        assert_eq!(camera.stats().incomplete_count, 5);
        camera.stop();
        assert_eq!(camera.stats().incomplete_count, 0);
        assert_eq!(camera.grab_frame().unwrap(), None);
    }
}
