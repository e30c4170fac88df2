use colored::Colorize;
use std::path::Path;
use std::time::Instant;

use crate::config::{load_config, Config};
use crate::processing::spectral;

const CONFIG_PATH: &str = "config.yaml";

/// Offline analysis of a recorded series file: one `time` column, then one
/// column per region. Each region gets its spectrum written next to the
/// input and its detected peaks printed.
pub fn run(path: &str) -> Result<(), String> {
    if !Path::new(path).exists() {
        return Err(format!("Failed to open series file: {} not found", path));
    }
    let config = if Path::new(CONFIG_PATH).exists() {
        load_config(CONFIG_PATH)?
    } else {
        Config::default()
    };

    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| format!("Failed to open series file: {}", e))?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| format!("Failed to read series headers: {}", e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.len() < 2 {
        return Err(
            "Failed to parse series file: need a time column and at least one region column"
                .to_string(),
        );
    }

    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); headers.len()];
    for result in reader.records() {
        let record = result.map_err(|e| format!("Failed to read series row: {}", e))?;
        for (index, field) in record.iter().enumerate() {
            if index < columns.len() {
                columns[index].push(field.trim().parse().unwrap_or(0.0));
            }
        }
    }

    let time = &columns[0];
    println!(
        "{}",
        format!(
            "replay: {} rows, {} regions from {}",
            time.len(),
            headers.len() - 1,
            path
        )
        .bold()
    );

    for (index, name) in headers.iter().enumerate().skip(1) {
        let values = &columns[index];
        let start_time = Instant::now();
        let (t, v) = spectral::apply_cutoffs(
            time,
            values,
            config.analysis.fft_window_min,
            config.analysis.fft_window_max,
        );
        let spectrum = spectral::compute_fft(&t, &v);
        let duration = start_time.elapsed();
        println!(
            "Analyzed region {} / {} in {:?}",
            index,
            headers.len() - 1,
            duration
        );

        let (freqs, psd) = match spectrum {
            Some(pair) => pair,
            None => {
                println!("{}", format!("{}: no usable spectrum", name).yellow());
                continue;
            }
        };

        let out_name = format!("analysis_{}.csv", name);
        let mut writer = csv::Writer::from_path(&out_name)
            .map_err(|e| format!("Failed to create {}: {}", out_name, e))?;
        writer
            .write_record(["frequency", "psd"])
            .map_err(|e| format!("Failed to write {}: {}", out_name, e))?;
        for (f, p) in freqs.iter().zip(psd.iter()) {
            writer
                .write_record([format!("{:.6}", f), format!("{:.6}", p)])
                .map_err(|e| format!("Failed to write {}: {}", out_name, e))?;
        }
        writer
            .flush()
            .map_err(|e| format!("Failed to flush {}: {}", out_name, e))?;

        match spectral::detect_peaks(
            &freqs,
            &psd,
            config.analysis.min_peak_frequency,
            config.analysis.peak_height_floor,
            config.analysis.min_peak_distance,
        ) {
            Some(peaks) if !peaks.is_empty() => {
                let listed = peaks
                    .iter()
                    .map(|p| format!("{:.3}", p))
                    .collect::<Vec<_>>()
                    .join(", ");
                println!(
                    "{}",
                    format!("{}: peaks at {} Hz, spectrum in {}", name, listed, out_name).green()
                );
            }
            Some(_) => println!(
                "{}",
                format!("{}: no peaks, spectrum in {}", name, out_name).white()
            ),
            None => println!("{}", format!("{}: peak detection failed", name).red()),
        }
    }
    Ok(())
}
