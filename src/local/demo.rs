use colored::Colorize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::acquisition::queue::{shared_queue, DEFAULT_QUEUE_CAPACITY};
use crate::acquisition::synthetic::SyntheticCamera;
use crate::acquisition::{FrameSource, SourceError, SourceStats};
use crate::config::{load_config, Config};
use crate::monitor::charts::create_shared_monitor;
use crate::processing::session::AnalysisSession;
use crate::regions::{Handle, RegionKind};
use crate::utils::log::{log_csv, log_with_header};

const CONFIG_PATH: &str = "config.yaml";
const RUN_SECONDS: f64 = 10.0;
const BAR_SCALE: f64 = 50000.0;
const BAR_MAX: usize = 80;

/// Live demo: a synthetic camera on a producer thread, the session draining
/// the shared queue on this one. Three regions sit over the stream: a box on
/// the oscillating spot, an ellipse on plain background, and a line across
/// the spot for the scan image.
pub fn run() -> Result<(), String> {
    let config = if Path::new(CONFIG_PATH).exists() {
        load_config(CONFIG_PATH)?
    } else {
        println!("No {} found, using defaults", CONFIG_PATH);
        Config::default()
    };

    // The canvas has to share the frame raster's size or every region skips.
    let mut canvas_config = config.canvas.clone();
    canvas_config.width = config.source.width as f64;
    canvas_config.height = config.source.height as f64;
    let mut session = AnalysisSession::new(
        canvas_config,
        config.sampler.clone(),
        config.analysis.clone(),
        config.session.clone(),
    );
    let monitor = create_shared_monitor(config.monitor.clone());
    let queue = shared_queue(DEFAULT_QUEUE_CAPACITY);

    let (w, h) = (config.source.width as f64, config.source.height as f64);
    let (cx, cy) = (w / 2.0, h / 2.0);
    let r = w.min(h) / 8.0;

    let spot = session
        .add_region(RegionKind::Rectangle, (cx - r - 10.0, cy - r - 10.0))
        .map_err(|e| e.to_string())?;
    session
        .resize_region(&spot, Handle::BottomRight, (cx + r + 10.0, cy + r + 10.0))
        .map_err(|e| e.to_string())?;
    let background = session
        .add_region(RegionKind::Ellipse, (10.0, 10.0))
        .map_err(|e| e.to_string())?;
    session
        .resize_region(&background, Handle::BottomRight, (90.0, 70.0))
        .map_err(|e| e.to_string())?;
    let scan_line = session
        .add_region(RegionKind::Line, (cx - r - 20.0, cy))
        .map_err(|e| e.to_string())?;
    session
        .resize_region(&scan_line, Handle::LineEnd, (cx + r + 20.0, cy))
        .map_err(|e| e.to_string())?;

    println!(
        "{}",
        format!(
            "demo: {} regions over a {:.0}x{:.0} synthetic stream at {:.0} fps",
            session.canvas().len(),
            w,
            h,
            config.source.frame_rate
        )
        .bold()
    );

    let stop_flag = Arc::new(AtomicBool::new(false));
    let producer_queue = Arc::clone(&queue);
    let producer_stop = Arc::clone(&stop_flag);
    let source_config = config.source.clone();
    let frame_interval = Duration::from_secs_f64(1.0 / config.source.frame_rate);
    let producer = thread::spawn(move || -> Result<SourceStats, SourceError> {
        let mut camera = SyntheticCamera::new(source_config)?;
        camera.start()?;
        while !producer_stop.load(Ordering::Relaxed) {
            if let Some(capture) = camera.grab_frame()? {
                producer_queue.lock().unwrap().push(capture);
            }
            thread::sleep(frame_interval);
        }
        let stats = camera.stats();
        camera.stop();
        Ok(stats)
    });

    let started = Instant::now();
    let mut incomplete_skipped: u64 = 0;
    let mut last_peak_check: u64 = 0;
    while started.elapsed().as_secs_f64() < RUN_SECONDS {
        let next = queue.lock().unwrap().pop();
        let capture = match next {
            Some(capture) => capture,
            None => {
                thread::sleep(Duration::from_millis(2));
                continue;
            }
        };
        if !capture.complete {
            incomplete_skipped += 1;
            continue;
        }
        if let Some(update) = session.process_frame(&capture.frame) {
            monitor.lock().unwrap().record_update(&update);

            if let Some(&value) = update
                .regions
                .get(&spot)
                .and_then(|snapshot| snapshot.values.last())
            {
                let bar_len = ((value / BAR_SCALE).max(0.0) as usize).min(BAR_MAX);
                println!("{:>6} {}", update.frame_index, "|".repeat(bar_len).white());
            }

            if update.frame_index >= last_peak_check + 60 {
                last_peak_check = update.frame_index;
                match session.detect_peaks_for(&spot) {
                    Some(peaks) if !peaks.is_empty() => {
                        let listed = peaks
                            .iter()
                            .map(|p| format!("{:.2}", p))
                            .collect::<Vec<_>>()
                            .join(", ");
                        println!(
                            "{}",
                            format!("oscillation candidates: {} Hz", listed).green()
                        );
                        monitor.lock().unwrap().record_peaks(&spot, &peaks);
                    }
                    _ => println!("{}", "no clear oscillation yet".yellow()),
                }
            }
        }
    }

    stop_flag.store(true, Ordering::Relaxed);
    let source_stats = producer
        .join()
        .map_err(|_| "Failed to join producer thread".to_string())?
        .map_err(|e| e.to_string())?;
    session.stop();

    let dropped = queue.lock().unwrap().dropped();
    println!();
    println!("{}", "demo finished".bold());
    println!("frames processed: {}", session.frames_processed());
    println!("incomplete frames skipped: {}", incomplete_skipped);
    println!("frames dropped at the queue: {}", dropped);
    println!(
        "source: {:.1} fps, {} incomplete frames seen",
        source_stats.real_fps, source_stats.incomplete_count
    );
    if let Some((lo, hi)) = monitor.lock().unwrap().time_range() {
        println!("monitor window: {:.2}s to {:.2}s", lo, hi);
    }

    match session.detect_peaks_for(&spot) {
        Some(peaks) if !peaks.is_empty() => {
            println!(
                "{}",
                format!(
                    "final oscillation estimate: {:.2} Hz (source set to {:.2} Hz)",
                    peaks[0], config.source.oscillation_hz
                )
                .green()
                .bold()
            );
        }
        _ => println!("{}", "no oscillation peak found in the final series".red()),
    }

    let mut ids: Vec<String> = session.store().ids().cloned().collect();
    ids.sort();
    let mut summary = String::new();
    for id in &ids {
        let (time, values) = session.store().get(id);
        println!("{}: {} samples", id, values.len());
        summary.push_str(&format!("{}: {} samples\n", id, values.len()));
        let filename = format!("demo_{}.csv", id);
        for (t, v) in time.iter().zip(values.iter()) {
            log_csv(
                &filename,
                &["time", "value"],
                &[&format!("{:.4}", t), &format!("{:.3}", v)],
            )
            .map_err(|e| format!("Failed to write series log: {}", e))?;
        }
    }
    summary.push_str(&format!(
        "frames: {}, dropped: {}, incomplete skipped: {}",
        session.frames_processed(),
        dropped,
        incomplete_skipped
    ));
    log_with_header("demo.log", "run summary", &summary)
        .map_err(|e| format!("Failed to write run summary: {}", e))?;

    Ok(())
}
