//! Immutable server configuration assembled from the command line.

use crate::cli::Cli;
use anyhow::Context;
use anyhow::Result;
use filedeck_core::FileDeckConfig;
use filedeck_core::RootDir;
use std::net::SocketAddr;
use std::time::Duration;

/// Everything the server needs, validated once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub deck: FileDeckConfig,
    pub bind: SocketAddr,
    pub password: Option<String>,
    /// Largest accepted request body: the smaller of the request and file
    /// size limits.
    pub max_upload: u64,
    pub session_ttl: Duration,
}

impl ServerConfig {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let root = RootDir::new(&cli.root)
            .with_context(|| format!("cannot serve root directory '{}'", cli.root.display()))?;

        let mut deck = FileDeckConfig::new(root);
        if let Some(name) = own_executable_name() {
            deck = deck.with_hidden_entry(name);
        }
        if let Some(scratch) = cli.scratch_dir {
            anyhow::ensure!(
                scratch.is_dir(),
                "scratch directory '{}' does not exist",
                scratch.display()
            );
            deck = deck.with_scratch_dir(scratch);
        }

        Ok(Self {
            deck,
            bind: cli.bind,
            password: cli.password.filter(|p| !p.is_empty()),
            max_upload: cli.max_request_size.min(cli.max_file_size),
            session_ttl: Duration::from_secs(cli.session_ttl),
        })
    }

    /// Upload limit as a body size usable by the HTTP layer.
    pub fn body_limit(&self) -> usize {
        usize::try_from(self.max_upload).unwrap_or(usize::MAX)
    }
}

/// File name of the running binary, hidden from listings so a copy deployed
/// inside the root does not list itself.
fn own_executable_name() -> Option<std::ffi::OsString> {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.file_name().map(ToOwned::to_owned))
}
