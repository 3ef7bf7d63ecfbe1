//! A sink that appends entries to size-rotated files in a directory.
use super::LogSink;
use crate::logging::format::{FormatKind, Formatter};
use crate::logging::{LogEntry, SinkError};
use async_trait::async_trait;
use chrono::Local;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Settings for a `FileSink`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FileSinkConfig {
    /// Directory holding the log files. Created on first write.
    pub directory: PathBuf,
    /// Files are named `{prefix}_{yyyyMMdd_HHmmss}.txt`.
    pub prefix: String,
    /// Size in bytes past which the current file is rotated.
    pub max_file_size: u64,
    /// Upper bound on the number of `{prefix}_*.txt` files kept in `directory`.
    pub max_retained_files: usize,
    pub format: FormatKind,
}

impl Default for FileSinkConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            prefix: "log".to_string(),
            max_file_size: 1024 * 1024,
            max_retained_files: 5,
            format: FormatKind::Text,
        }
    }
}

/// The file currently being appended to.
struct CurrentFile {
    path: PathBuf,
    stamp: String,
    /// Disambiguates files created within the same second.
    seq: u32,
}

/// Appends formatted entries to the current log file, rotating by size.
///
/// All writes to one sink are serialized by an async mutex over the current
/// file, so rotation never races with an append.
pub struct FileSink {
    directory: PathBuf,
    prefix: String,
    max_file_size: u64,
    max_retained_files: usize,
    formatter: Arc<dyn Formatter>,
    current: Mutex<CurrentFile>,
}

impl FileSink {
    /// Creates a file sink using the formatter named in `config`.
    ///
    /// No I/O happens here; the first file is created by the first write.
    pub fn new(config: FileSinkConfig) -> Self {
        let formatter = config.format.formatter();
        Self::with_formatter(config, formatter)
    }

    /// Creates a file sink with an explicit formatter.
    pub fn with_formatter(config: FileSinkConfig, formatter: Arc<dyn Formatter>) -> Self {
        let stamp = file_stamp();
        let path = config
            .directory
            .join(format!("{}_{}.txt", config.prefix, stamp));

        Self {
            directory: config.directory,
            prefix: config.prefix,
            max_file_size: config.max_file_size,
            max_retained_files: config.max_retained_files.max(1),
            formatter,
            current: Mutex::new(CurrentFile {
                path,
                stamp,
                seq: 0,
            }),
        }
    }

    /// Returns the path of the file the next entry will be appended to.
    pub async fn current_path(&self) -> PathBuf {
        self.current.lock().await.path.clone()
    }

    /// Lists this sink's log files in the directory, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub async fn retained_files(&self) -> std::io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut dir = match fs::read_dir(&self.directory).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(files),
            Err(e) => return Err(e),
        };

        while let Some(item) = dir.next_entry().await? {
            let path = item.path();
            if self.is_own_file(&path) {
                files.push(path);
            }
        }

        // Names embed the creation stamp, so name order is age order.
        files.sort();
        Ok(files)
    }

    fn is_own_file(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        name.strip_prefix(&self.prefix)
            .and_then(|rest| rest.strip_prefix('_'))
            .filter(|rest| rest.ends_with(".txt"))
            .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
    }

    /// Moves `current` to a fresh timestamped path.
    fn advance(&self, current: &mut CurrentFile) {
        let stamp = file_stamp();
        if stamp == current.stamp {
            current.seq += 1;
        } else {
            current.stamp = stamp;
            current.seq = 0;
        }

        let name = if current.seq == 0 {
            format!("{}_{}.txt", self.prefix, current.stamp)
        } else {
            format!("{}_{}_{:06}.txt", self.prefix, current.stamp, current.seq)
        };
        current.path = self.directory.join(name);
    }

    /// Deletes the oldest files until one more file fits under the retention limit.
    async fn make_room(&self) -> Result<(), SinkError> {
        let rotation_err = |source| SinkError::Rotation {
            dir: self.directory.clone(),
            source,
        };

        fs::create_dir_all(&self.directory)
            .await
            .map_err(rotation_err)?;

        let files = self.retained_files().await.map_err(rotation_err)?;
        let excess = (files.len() + 1).saturating_sub(self.max_retained_files);
        for old in files.iter().take(excess) {
            debug!("Deleting old log file {}", old.display());
            fs::remove_file(old).await.map_err(rotation_err)?;
        }
        Ok(())
    }
}

#[async_trait]
impl LogSink for FileSink {
    fn accepts(&self, category: &str) -> bool {
        !category.is_empty()
    }

    async fn write(&self, entry: &LogEntry) -> Result<(), SinkError> {
        let mut current = self.current.lock().await;

        // A file that can't be inspected is treated as missing; creating it
        // surfaces the real error.
        let size = fs::metadata(&current.path).await.ok().map(|meta| meta.len());

        let needs_new_file = match size {
            Some(len) if len > self.max_file_size => {
                self.advance(&mut current);
                info!(
                    "Rotating log file after {} bytes, next file {}",
                    len,
                    current.path.display()
                );
                true
            }
            Some(_) => false,
            None => true,
        };

        if needs_new_file {
            self.make_room().await?;
        }

        let mut line = self.formatter.format(entry);
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&current.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Filename stamp, `yyyyMMdd_HHmmss` in local time.
fn file_stamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}
