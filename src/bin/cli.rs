use clap::Parser;
use indicatif::{MultiProgress, ProgressDrawTarget};
use indicatif_log_bridge::LogWrapper;
use log::{LevelFilter, debug};
use std::path::PathBuf;
use std::process::ExitCode;
use ytgrab::request::{Container, DownloadRequest, format_id_selector, parse_list};
use ytgrab::{AppError, Config, FetchOrchestrator, YtDlp};

#[derive(Parser, Clone, Debug)]
#[command(name = "ytgrab", version, about = "Downloads YouTube videos through yt-dlp.")]
pub struct Cli {
    /// The video URL, or a bare video id.
    pub url: String,

    /// A directory, or a full file path whose extension follows the container.
    #[arg(long = "output", short = 'o')]
    pub output: Option<String>,

    /// The destination directory.
    #[arg(long = "output-dir", conflicts_with = "output")]
    pub output_dir: Option<String>,

    /// The format selector [default: bv*[ext=mp4]+ba[ext=m4a]/bv*+ba/b]
    #[arg(long = "format", short = 'f')]
    pub format: Option<String>,

    /// Downloads this format id with the best audio.
    #[arg(long = "format-id", conflicts_with = "format")]
    pub format_id: Option<String>,

    /// Comma-separated player clients, tried in order [default: android,web]
    #[arg(long = "player-client")]
    pub player_client: Option<String>,

    /// The container to remux into, `none` to keep the native one [default: mp4]
    #[arg(long = "merge-output-format")]
    pub merge_output_format: Option<String>,

    /// Comma-separated subtitle languages, e.g. `ja,en`.
    #[arg(long = "sub-langs")]
    pub sub_langs: Option<String>,

    #[arg(long = "no-progress", action = clap::ArgAction::SetTrue)]
    pub no_progress: bool,

    #[arg(long = "no-summary", action = clap::ArgAction::SetTrue)]
    pub no_summary: bool,

    /// Prints the available formats and exits.
    #[arg(long = "list-formats", action = clap::ArgAction::SetTrue)]
    pub list_formats: bool,

    #[arg(long = "embed-thumbnail", action = clap::ArgAction::SetTrue)]
    pub embed_thumbnail: bool,

    #[arg(long = "add-metadata", action = clap::ArgAction::SetTrue)]
    pub add_metadata: bool,

    #[arg(long = "no-check-certificate", action = clap::ArgAction::SetTrue)]
    pub no_check_certificate: bool,

    #[arg(long = "geo-bypass", action = clap::ArgAction::SetTrue)]
    pub geo_bypass: bool,

    /// The yt-dlp executable to run.
    #[arg(long = "yt-dlp")]
    pub yt_dlp: Option<PathBuf>,

    /// An alternate config file.
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    #[arg(
        long = "verbosity",
        short,
        default_value = "info",
        value_parser = clap::builder::PossibleValuesParser::new([
            "info", "debug", "error", "none", "full"
        ])
    )]
    pub verbosity: String,
}

impl Cli {
    /// Layers the command line over `base`, the request read from the config file.
    pub fn apply(&self, base: DownloadRequest) -> DownloadRequest {
        let mut request = base;

        if let Some(output) = &self.output {
            request.output_hint = Some(output.clone());
            request.output_is_directory = false;
        } else if let Some(dir) = &self.output_dir {
            request.output_hint = Some(dir.clone());
            request.output_is_directory = true;
        }
        if let Some(format) = &self.format {
            request.format_selector = format.clone();
        }
        if let Some(format_id) = &self.format_id {
            request.format_selector = format_id_selector(format_id);
        }
        if let Some(clients) = &self.player_client {
            request.client_identifiers = parse_list(clients);
        }
        if let Some(container) = &self.merge_output_format {
            request.container = Container::parse(container);
        }
        if let Some(languages) = &self.sub_langs {
            request.subtitle_languages = parse_list(languages);
        }

        request.no_progress |= self.no_progress;
        request.summary &= !self.no_summary;
        request.embed_thumbnail |= self.embed_thumbnail;
        request.add_metadata |= self.add_metadata;
        request.no_check_certificate |= self.no_check_certificate;
        request.geo_bypass |= self.geo_bypass;

        request
    }
}

fn level_filter(verbosity: &str) -> LevelFilter {
    match verbosity {
        "none" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "debug" => LevelFilter::Debug,
        "full" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn init_logging(multi: &MultiProgress, verbosity: &str) {
    let level = level_filter(verbosity);
    let logger = env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .build();

    if let Err(e) = LogWrapper::new(multi.clone(), logger).try_init() {
        eprintln!("Cannot install the logger: {}", e);
    }
    log::set_max_level(level);
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Cli::parse();

    let multi = MultiProgress::with_draw_target(ProgressDrawTarget::stdout());
    init_logging(&multi, &args.verbosity);

    let config = Config::load(args.config.as_deref());
    let request = args.apply(config.request());

    let executable = args.yt_dlp.clone().or(config.yt_dlp_path);
    let fetcher = match YtDlp::locate(executable.as_deref()) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            let error = AppError::from(e);
            eprintln!("❌ {}", error);
            eprintln!("Install yt-dlp or point --yt-dlp at the executable.");
            return ExitCode::from(error.exit_code());
        }
    };

    debug!("Using yt-dlp at {}", fetcher.executable.display());

    let orchestrator = FetchOrchestrator::new(fetcher, multi);
    if args.list_formats {
        orchestrator.list_formats(&args.url, &request).await
    } else {
        orchestrator.run(&args.url, &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ytgrab").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn nothing_on_the_command_line_keeps_the_config() {
        let base = DownloadRequest {
            format_selector: "b".to_string(),
            geo_bypass: true,
            ..DownloadRequest::default()
        };

        assert_eq!(parse(&["dQw4w9WgXcQ"]).apply(base.clone()), base);
    }

    #[test]
    fn command_line_overrides_the_config() {
        let base = DownloadRequest {
            format_selector: "b".to_string(),
            output_hint: Some("from-config".to_string()),
            ..DownloadRequest::default()
        };

        let request = parse(&[
            "dQw4w9WgXcQ",
            "-o",
            "clips/show.mkv",
            "-f",
            "bv*+ba",
            "--player-client",
            "web, tv",
            "--merge-output-format",
            "none",
            "--sub-langs",
            "ja,en",
            "--no-summary",
            "--embed-thumbnail",
        ])
        .apply(base);

        assert_eq!(request.output_hint.as_deref(), Some("clips/show.mkv"));
        assert_eq!(request.format_selector, "bv*+ba");
        assert_eq!(request.client_identifiers, vec!["web", "tv"]);
        assert_eq!(request.container, Container::Native);
        assert_eq!(request.subtitle_languages, vec!["ja", "en"]);
        assert!(!request.summary);
        assert!(request.embed_thumbnail);
    }

    #[test]
    fn format_id_picks_one_format_with_best_audio() {
        let request = parse(&["dQw4w9WgXcQ", "--format-id", "22"]).apply(DownloadRequest::default());
        assert_eq!(request.format_selector, "22+bestaudio/best");
    }

    #[test]
    fn output_dir_is_a_legacy_alias() {
        let request = parse(&["dQw4w9WgXcQ", "--output-dir", "downloads"]).apply(DownloadRequest::default());
        assert_eq!(request.output_hint.as_deref(), Some("downloads"));
        assert!(request.output_is_directory);

        let dotted = parse(&["dQw4w9WgXcQ", "--output-dir", "season.best"]).apply(DownloadRequest::default());
        assert_eq!(dotted.output_hint.as_deref(), Some("season.best"));
        assert!(dotted.output_is_directory);

        let file = parse(&["dQw4w9WgXcQ", "-o", "show.mkv"]).apply(DownloadRequest {
            output_hint: Some("from-config".to_string()),
            output_is_directory: true,
            ..DownloadRequest::default()
        });
        assert!(!file.output_is_directory);

        let both = Cli::try_parse_from(["ytgrab", "x", "-o", "a", "--output-dir", "b"]);
        assert!(both.is_err());
    }

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_filter("none"), LevelFilter::Off);
        assert_eq!(level_filter("full"), LevelFilter::Trace);
        assert_eq!(level_filter(&parse(&["x"]).verbosity), LevelFilter::Info);
        assert!(Cli::try_parse_from(["ytgrab", "x", "-v", "loud"]).is_err());
    }
}
