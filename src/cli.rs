//! CLI argument definitions using clap derive macros.

use clap::{Args, Parser, Subcommand};
use url::Url;

use tubemeta_core::config::{
    DEFAULT_CHUNK_SIZE, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS,
};

/// Fetch playlist and video metadata as JSON.
#[derive(Parser, Debug)]
#[command(name = "tubemeta")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch playlist metadata including every item
    Playlist(FetchArgs),
    /// Fetch video metadata
    Video(FetchArgs),
}

impl Command {
    pub fn args(&self) -> &FetchArgs {
        match self {
            Self::Playlist(args) | Self::Video(args) => args,
        }
    }

    /// Output pattern used when `--output` is not given.
    pub fn default_output(&self) -> &'static str {
        match self {
            Self::Playlist(_) => "list_{id}.json",
            Self::Video(_) => "video_{id}.json",
        }
    }

    /// Effective output pattern (`{id}` is replaced per item, `-` means stdout).
    pub fn output_pattern(&self) -> &str {
        self.args()
            .output
            .as_deref()
            .unwrap_or_else(|| self.default_output())
    }
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Playlist or video ids
    #[arg(value_name = "ID", required = true)]
    pub ids: Vec<String>,

    /// Output file name; `{id}` is replaced by the id, `-` writes to stdout
    #[arg(short, long, value_name = "PATTERN")]
    pub output: Option<String>,

    /// Indent JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Bytes read from the response body per parser step (1-1048576)
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE as u64, value_parser = clap::value_parser!(u64).range(1..=1_048_576))]
    pub chunk_size: u64,

    /// Ids fetched at the same time (1-16)
    #[arg(short = 'c', long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=16))]
    pub concurrency: u8,

    /// Connect timeout in seconds (1-300)
    #[arg(long, default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=300))]
    pub connect_timeout: u64,

    /// Read timeout in seconds (1-3600)
    #[arg(long, default_value_t = DEFAULT_READ_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub read_timeout: u64,

    /// Drop repeated playlist items (same id), keeping the first
    #[arg(long)]
    pub unique: bool,

    /// Site origin override
    #[arg(long, hide = true)]
    pub base_url: Option<Url>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_playlist_defaults() {
        let cli = Cli::try_parse_from(["tubemeta", "playlist", "PL1"]).unwrap();
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
        assert!(matches!(cli.command, Command::Playlist(_)));
        let args = cli.command.args();
        assert_eq!(args.ids, vec!["PL1"]);
        assert_eq!(args.chunk_size, 1024);
        assert_eq!(args.concurrency, 1);
        assert_eq!(args.connect_timeout, 10);
        assert_eq!(args.read_timeout, 30);
        assert!(!args.pretty);
        assert!(!args.unique);
        assert_eq!(cli.command.output_pattern(), "list_{id}.json");
    }

    #[test]
    fn test_cli_video_default_output() {
        let cli = Cli::try_parse_from(["tubemeta", "video", "a", "b"]).unwrap();
        assert_eq!(cli.command.args().ids, vec!["a", "b"]);
        assert_eq!(cli.command.output_pattern(), "video_{id}.json");
    }

    #[test]
    fn test_cli_output_and_pretty() {
        let cli =
            Cli::try_parse_from(["tubemeta", "playlist", "--output", "-", "--pretty", "PL1"])
                .unwrap();
        assert_eq!(cli.command.output_pattern(), "-");
        assert!(cli.command.args().pretty);
    }

    #[test]
    fn test_cli_requires_at_least_one_id() {
        let err = Cli::try_parse_from(["tubemeta", "playlist"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["tubemeta"]).is_err());
    }

    #[test]
    fn test_cli_verbose_is_global() {
        let cli = Cli::try_parse_from(["tubemeta", "video", "-vv", "x"]).unwrap();
        assert_eq!(cli.verbose, 2);
        let cli = Cli::try_parse_from(["tubemeta", "-q", "video", "x"]).unwrap();
        assert!(cli.quiet);
    }

    #[test]
    fn test_cli_concurrency_range() {
        let cli = Cli::try_parse_from(["tubemeta", "playlist", "-c", "16", "x"]).unwrap();
        assert_eq!(cli.command.args().concurrency, 16);

        let err = Cli::try_parse_from(["tubemeta", "playlist", "-c", "17", "x"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        let err = Cli::try_parse_from(["tubemeta", "playlist", "-c", "0", "x"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_chunk_size_zero_rejected() {
        let err =
            Cli::try_parse_from(["tubemeta", "playlist", "--chunk-size", "0", "x"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_hidden_base_url() {
        let cli = Cli::try_parse_from([
            "tubemeta",
            "video",
            "--base-url",
            "http://127.0.0.1:9000",
            "x",
        ])
        .unwrap();
        assert_eq!(
            cli.command.args().base_url.as_ref().map(Url::as_str),
            Some("http://127.0.0.1:9000/")
        );
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = Cli::try_parse_from(["tubemeta", "playlist", "--invalid-flag", "x"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
