use std::path::PathBuf;

const CACHE_DIR: &str = "botblitz_viewer";
const SNAPSHOT_FILE: &str = "gs-season.db";

pub const DEFAULT_DB_URL: &str =
    "https://raw.githubusercontent.com/mitchwebster/botblitz/main/data/game_states/2025/gs-season.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotSource {
    Local(PathBuf),
    Remote { url: String, cache_path: PathBuf },
}

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub source: SnapshotSource,
    pub cache_dir: Option<PathBuf>,
    pub export_dir: PathBuf,
    pub log_filter: Option<String>,
}

impl ViewerConfig {
    pub fn from_env() -> Self {
        let cache_dir = app_cache_dir();
        let source = match non_empty_env("BOTBLITZ_DB_PATH") {
            Some(path) => SnapshotSource::Local(PathBuf::from(path)),
            None => {
                let url =
                    non_empty_env("BOTBLITZ_DB_URL").unwrap_or_else(|| DEFAULT_DB_URL.to_string());
                let cache_path = cache_dir
                    .as_ref()
                    .map(|dir| dir.join(SNAPSHOT_FILE))
                    .unwrap_or_else(|| PathBuf::from(SNAPSHOT_FILE));
                SnapshotSource::Remote { url, cache_path }
            }
        };
        let export_dir = non_empty_env("BOTBLITZ_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            source,
            cache_dir,
            export_dir,
            log_filter: non_empty_env("BOTBLITZ_LOG"),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Some(dir) = non_empty_env("BOTBLITZ_CACHE_DIR") {
        return Some(PathBuf::from(dir));
    }
    // Prefer XDG cache.
    if let Some(base) = non_empty_env("XDG_CACHE_HOME") {
        return Some(PathBuf::from(base).join(CACHE_DIR));
    }
    let home = non_empty_env("HOME")?;
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}
