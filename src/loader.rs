use std::fs;
use std::path::Path;
use std::sync::mpsc::Sender;
use std::thread;

use anyhow::{Context, Result, anyhow};

use crate::config::SnapshotSource;
use crate::dataset::SqliteDataset;
use crate::http_client::http_client;

#[derive(Debug)]
pub enum LoaderEvent {
    Log(String),
    Ready(SqliteDataset),
    Failed(String),
}

pub fn spawn_loader(source: SnapshotSource, tx: Sender<LoaderEvent>) {
    thread::spawn(move || {
        let outcome = load_snapshot(&source, |msg| {
            let _ = tx.send(LoaderEvent::Log(msg));
        });
        let event = match outcome {
            Ok(dataset) => LoaderEvent::Ready(dataset),
            Err(err) => LoaderEvent::Failed(format!("{err:#}")),
        };
        let _ = tx.send(event);
    });
}

/// Resolves the snapshot to a local file (downloading it once if needed) and opens it
/// read-only.
pub fn load_snapshot(source: &SnapshotSource, mut log: impl FnMut(String)) -> Result<SqliteDataset> {
    let path = match source {
        SnapshotSource::Local(path) => {
            if !path.exists() {
                return Err(anyhow!("snapshot {} does not exist", path.display()));
            }
            log(format!("[INFO] Opening snapshot {}", path.display()));
            path.clone()
        }
        SnapshotSource::Remote { url, cache_path } => {
            if cache_path.exists() {
                log(format!("[INFO] Using cached snapshot {}", cache_path.display()));
            } else {
                log(format!("[INFO] Downloading snapshot {url}"));
                let bytes = download_snapshot(url, cache_path)?;
                log(format!("[INFO] Downloaded {bytes} bytes"));
            }
            cache_path.clone()
        }
    };
    let dataset = SqliteDataset::open_read_only(&path)?;
    tracing::info!(path = %path.display(), "snapshot opened");
    Ok(dataset)
}

/// Fetches `url` into `dest` through a temp file so a partial download never looks cached.
pub fn download_snapshot(url: &str, dest: &Path) -> Result<usize> {
    let client = http_client()?;
    let resp = client
        .get(url)
        .send()
        .with_context(|| format!("request {url}"))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(anyhow!("http {status} fetching {url}"));
    }
    let body = resp.bytes().context("failed reading snapshot body")?;

    if let Some(dir) = dest.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let tmp = dest.with_extension("db.tmp");
    fs::write(&tmp, &body).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, dest).with_context(|| format!("swap {}", dest.display()))?;
    Ok(body.len())
}
