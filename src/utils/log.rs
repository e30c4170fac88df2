use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

const LOG_DIR: &str = "logs";

/// Opens a log file under `logs/` in append mode, creating the directory on
/// first use. Also reports whether the file existed beforehand.
fn open_log(filename: &str) -> io::Result<(File, bool)> {
    if !Path::new(LOG_DIR).exists() {
        std::fs::create_dir_all(LOG_DIR)?;
    }
    let path = format!("{}/{}", LOG_DIR, filename);
    let existed = Path::new(&path).exists();
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok((file, existed))
}

/// Appends one timestamped line to a log file under `logs/`
///
/// # Arguments
///
/// * `filename` - The name of the log file
/// * `message` - The message to log
///
/// # Returns
///
/// * `io::Result<()>` - Success or error result
pub fn log_to_file(filename: &str, message: &str) -> io::Result<()> {
    let (mut file, _) = open_log(filename)?;
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
    writeln!(file, "[{}] {}", timestamp, message)?;
    // Ensure the data is written to disk
    file.flush()?;
    Ok(())
}

/// Logs a message under a banner header, for run summaries
///
/// # Arguments
///
/// * `filename` - The name of the log file
/// * `header` - A descriptive header for this log entry
/// * `message` - The message to log
///
/// # Returns
///
/// * `io::Result<()>` - Success or error result
pub fn log_with_header(filename: &str, header: &str, message: &str) -> io::Result<()> {
    let formatted_message = format!(
        "===== {} =====\n{}\n====================",
        header, message
    );
    log_to_file(filename, &formatted_message)
}

/// Appends a row to a CSV file under `logs/`, writing the header row first
/// if the file is new
///
/// # Arguments
///
/// * `filename` - The name of the CSV file
/// * `headers` - Column headers (only written if file is new)
/// * `data` - Row of data to append
///
/// # Returns
///
/// * `io::Result<()>` - Success or error result
pub fn log_csv(filename: &str, headers: &[&str], data: &[&str]) -> io::Result<()> {
    let (mut file, existed) = open_log(filename)?;
    if !existed && !headers.is_empty() {
        writeln!(file, "{}", headers.join(","))?;
    }
    writeln!(file, "{}", data.join(","))?;
    file.flush()?;
    Ok(())
}
