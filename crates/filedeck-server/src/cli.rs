//! CLI argument parsing using clap.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "filedeck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to serve; nothing outside it is reachable
    #[arg(long, env = "FILEDECK_ROOT", value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Address to listen on
    #[arg(
        long,
        env = "FILEDECK_BIND",
        value_name = "ADDR",
        default_value = "127.0.0.1:8080"
    )]
    pub bind: SocketAddr,

    /// Require this password before serving anything
    #[arg(long, env = "FILEDECK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Maximum request body size (accepts K, M, G suffixes)
    #[arg(
        long,
        env = "FILEDECK_MAX_REQUEST_SIZE",
        value_name = "SIZE",
        default_value = "64M",
        value_parser = parse_byte_size
    )]
    pub max_request_size: u64,

    /// Maximum size of a single uploaded file (accepts K, M, G suffixes)
    #[arg(
        long,
        env = "FILEDECK_MAX_FILE_SIZE",
        value_name = "SIZE",
        default_value = "32M",
        value_parser = parse_byte_size
    )]
    pub max_file_size: u64,

    /// Directory for temporary zip archives (default: system temp dir)
    #[arg(long, env = "FILEDECK_SCRATCH_DIR", value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Lifetime of a login session in seconds
    #[arg(long, env = "FILEDECK_SESSION_TTL", value_name = "SECS", default_value = "86400")]
    pub session_ttl: u64,
}

/// Parse byte size with optional suffix (K, M, G)
#[allow(clippy::option_if_let_else)]
fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty byte size".to_string());
    }

    let upper = s.to_ascii_uppercase();
    let (num_str, multiplier) = if let Some(stripped) = upper.strip_suffix('G') {
        (stripped, 1024_u64.pow(3))
    } else if let Some(stripped) = upper.strip_suffix('M') {
        (stripped, 1024_u64.pow(2))
    } else if let Some(stripped) = upper.strip_suffix('K') {
        (stripped, 1024)
    } else {
        (upper.as_str(), 1)
    };

    num_str
        .trim()
        .parse::<u64>()
        .map_err(|_| format!("invalid byte size: {s}"))
        .and_then(|n| {
            n.checked_mul(multiplier)
                .ok_or_else(|| format!("byte size overflow: {s}"))
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_byte_size() {
        assert_eq!(parse_byte_size("100").unwrap(), 100);
        assert_eq!(parse_byte_size("1K").unwrap(), 1024);
        assert_eq!(parse_byte_size("64M").unwrap(), 64 * 1024 * 1024);
        assert_eq!(parse_byte_size("2G").unwrap(), 2 * 1024 * 1024 * 1024);
    }

    #[test]
    fn test_parse_byte_size_lowercase_suffix() {
        assert_eq!(parse_byte_size("8m").unwrap(), 8 * 1024 * 1024);
        assert_eq!(parse_byte_size(" 4k ").unwrap(), 4096);
    }

    #[test]
    fn test_parse_byte_size_invalid() {
        assert!(parse_byte_size("").is_err());
        assert!(parse_byte_size("abc").is_err());
        assert!(parse_byte_size("10X").is_err());
        assert!(parse_byte_size("99999999999G").is_err());
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["filedeck"]).unwrap();
        assert_eq!(cli.root, PathBuf::from("."));
        assert_eq!(cli.bind, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(cli.max_request_size, 64 * 1024 * 1024);
        assert_eq!(cli.max_file_size, 32 * 1024 * 1024);
        assert_eq!(cli.session_ttl, 86_400);
    }

    #[test]
    fn test_cli_structure() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
