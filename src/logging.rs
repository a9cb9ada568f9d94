use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, Write};
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;

// Log entry structure
struct LogEntry {
    domain: String,
    message: String,
    timestamp: String,
}

lazy_static::lazy_static! {
    static ref LOG_TX: Mutex<Option<mpsc::Sender<LogEntry>>> = Mutex::new(None);
    static ref LOG_DIR_PATH: Mutex<Option<PathBuf>> = Mutex::new(None);
}

fn domain_file(domain: &str) -> &'static str {
    match domain {
        "audit" => "audit.log",
        "service" => "service.log",
        "crash" => "crash.log",
        _ => "custom.log",
    }
}

fn domain_prefix(domain: &str) -> &'static str {
    match domain {
        "audit" => "[AUDIT]",
        "service" => "[SERVICE]",
        "crash" => "[CRASH]",
        _ => "",
    }
}

/// Initialize the log directory and start the background logger thread
pub fn init_log_dir(path: PathBuf) {
    // Store path for panic hook
    if let Ok(mut dir) = LOG_DIR_PATH.lock() {
        *dir = Some(path.clone());
    }

    let (tx, rx) = mpsc::channel::<LogEntry>();

    if let Ok(mut global_tx) = LOG_TX.lock() {
        *global_tx = Some(tx);
    }

    thread::spawn(move || {
        let mut file_cache: HashMap<&'static str, File> = HashMap::new();
        let log_dir = path.join("logs");

        if !log_dir.exists() {
            let _ = std::fs::create_dir_all(&log_dir);
        }

        while let Ok(entry) = rx.recv() {
            let filename = domain_file(&entry.domain);

            if !file_cache.contains_key(filename) {
                match OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(log_dir.join(filename))
                {
                    Ok(file) => {
                        file_cache.insert(filename, file);
                    }
                    Err(e) => {
                        eprintln!("Failed to open {}: {}", filename, e);
                        continue;
                    }
                }
            }

            let prefix = domain_prefix(&entry.domain);
            let final_message = if !prefix.is_empty() && !entry.message.contains(prefix) {
                format!("{} {}", prefix, entry.message)
            } else {
                entry.message
            };

            if let Some(file) = file_cache.get_mut(filename) {
                if let Err(e) = writeln!(file, "[{}] {}", entry.timestamp, final_message) {
                    eprintln!("Failed to write log: {}", e);
                    // Reopen on the next entry
                    file_cache.remove(filename);
                }
            }
        }
    });
}

/// Setup panic hook to log crashes to crash.log.
/// Writes directly from the panicking thread; the logger thread may be gone.
pub fn setup_panic_hook() {
    panic::set_hook(Box::new(|info| {
        let msg = format!(
            "{}\nBacktrace: {:?}\n",
            info,
            std::backtrace::Backtrace::capture()
        );
        eprintln!("{}", msg);

        if let Ok(guard) = LOG_DIR_PATH.lock() {
            if let Some(ref dir) = *guard {
                let crash_file = dir.join("logs").join("crash.log");
                if let Some(parent) = crash_file.parent() {
                    let _ = std::fs::create_dir_all(parent);
                }

                if let Ok(mut file) = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(crash_file)
                {
                    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
                    let _ = writeln!(file, "[{}] {}", timestamp, msg);
                }
            }
        }
    }));
}

/// Queue a message to be written to a specialized domain log file
pub fn write_domain_log(domain: &str, message: &str) -> std::io::Result<()> {
    if let Ok(guard) = LOG_TX.lock() {
        if let Some(tx) = &*guard {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
            let _ = tx.send(LogEntry {
                domain: domain.to_string(),
                message: message.to_string(),
                timestamp,
            });
            return Ok(());
        }
    }
    Err(std::io::Error::new(
        std::io::ErrorKind::Other,
        "Logger not initialized",
    ))
}

fn log_filename(log_name: &str) -> Option<&'static str> {
    match log_name {
        "app" => Some("app.log"),
        "audit" => Some("audit.log"),
        "service" => Some("service.log"),
        "crash" => Some("crash.log"),
        _ => None,
    }
}

/// Last `lines` lines of a named log under `log_dir`.
/// Reads through a snapshot copy so the writer is never blocked.
pub fn tail_log(log_dir: &Path, log_name: &str, lines: usize) -> Result<Vec<String>, String> {
    let log_filename =
        log_filename(log_name).ok_or_else(|| format!("Unknown log name: {}", log_name))?;
    let log_path = log_dir.join(log_filename);

    if !log_path.exists() {
        return Ok(vec![format!("Log file {} not found.", log_filename)]);
    }

    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let temp_path = std::env::temp_dir().join(format!("{}_snap_{}.txt", log_filename, nanos));

    let mut attempts = 0;
    while attempts < 3 {
        match std::fs::copy(&log_path, &temp_path) {
            Ok(_) => break,
            Err(_) => {
                attempts += 1;
                std::thread::sleep(std::time::Duration::from_millis(50));
            }
        }
    }

    if !temp_path.exists() {
        return Ok(vec!["Could not read logs (File locked).".to_string()]);
    }

    let file = File::open(&temp_path).map_err(|e| e.to_string())?;
    let reader = std::io::BufReader::new(file);
    let all_lines: Vec<String> = reader
        .split(b'\n')
        .flatten()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .collect();
    let _ = std::fs::remove_file(&temp_path);

    let skip = all_lines.len().saturating_sub(lines);
    Ok(all_lines.into_iter().skip(skip).collect())
}

#[cfg_attr(feature = "desktop", tauri::command)]
pub fn log_domain_event(domain: String, message: String) {
    let _ = write_domain_log(&domain, &message);
}

#[cfg_attr(feature = "desktop", tauri::command)]
pub async fn get_logs(log_name: String, lines: usize) -> Result<Vec<String>, String> {
    let root_dir = crate::config::get_app_root_dir()?;
    tail_log(&root_dir.join("logs"), &log_name, lines)
}
