use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

const CONNECT_TIMEOUT_SECS: u64 = 10;
// Season snapshots run to tens of megabytes.
const DOWNLOAD_TIMEOUT_SECS: u64 = 120;

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
            .user_agent(concat!("botblitz_viewer/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build http client")
    })
}
