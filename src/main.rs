use std::sync::Arc;

use clap::{
    Args, CommandFactory, Parser, Subcommand, ValueEnum,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use sporlcover::{
    cli,
    config,
    cover::Ladder,
    error,
    openai::CreationMethod,
    types::PkceToken,
};
use tokio::sync::Mutex;

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API (needed for uploads)
    Auth,

    /// List playlists of a user
    Playlists(PlaylistsOptions),

    /// List tracks of a playlist
    Tracks(TracksOptions),

    /// Generate a cover from the tracks of a playlist
    Generate(GenerateOptions),

    /// Upload an image as playlist cover
    Upload(UploadOptions),

    /// Run the HTTP backend
    Serve,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct PlaylistsOptions {
    /// Spotify user id
    pub user_id: String,

    /// Only show playlists whose name contains this term
    #[clap(long)]
    pub search: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct TracksOptions {
    /// Spotify playlist id
    pub playlist_id: String,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Method {
    /// Fuse the album artwork of the tracks
    TrackThumbnails,
    /// Fuse the titles and artists of the tracks
    TitlesArtists,
}

impl From<Method> for CreationMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::TrackThumbnails => CreationMethod::TrackThumbnails,
            Method::TitlesArtists => CreationMethod::TitlesArtists,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct LadderOptions {
    /// Size ceilings in KB, tried in order (e.g. 55,50,45)
    #[clap(long, value_parser = parse_ladder)]
    pub ladder: Option<Ladder>,

    /// Timeout per upload attempt in seconds
    #[clap(long)]
    pub timeout: Option<u64>,

    /// Give up after this many seconds overall
    #[clap(long)]
    pub deadline: Option<u64>,
}

impl From<LadderOptions> for cli::UploadArgs {
    fn from(opt: LadderOptions) -> Self {
        cli::UploadArgs {
            ladder: opt.ladder,
            timeout: opt.timeout,
            deadline: opt.deadline,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct GenerateOptions {
    /// Spotify playlist id
    pub playlist_id: String,

    #[clap(long, value_enum, default_value = "track-thumbnails")]
    pub method: Method,

    /// Mood or style of the cover
    #[clap(long)]
    pub mood: Option<String>,

    /// Title used as base for the vibe of the cover
    #[clap(long)]
    pub title: Option<String>,

    /// Number of tracks taken from the start of the playlist
    #[clap(long, default_value_t = 10)]
    pub limit: usize,

    /// Upload the generated cover right away
    #[clap(long)]
    pub upload: bool,

    #[command(flatten)]
    pub ladder: LadderOptions,
}

#[derive(Parser, Debug, Clone)]
#[command(group(
    clap::ArgGroup::new("source")
        .required(true)
        .args(["image_url", "file"]),
))]
pub struct UploadOptions {
    /// Spotify playlist id
    pub playlist_id: String,

    /// URL of the image to upload
    #[clap(long)]
    pub image_url: Option<String>,

    /// Local image file to upload
    #[clap(long)]
    pub file: Option<String>,

    #[command(flatten)]
    pub ladder: LadderOptions,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn parse_ladder(value: &str) -> Result<Ladder, String> {
    value.parse::<Ladder>().map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth => {
            let oauth_result: Arc<Mutex<Option<PkceToken>>> = Arc::new(Mutex::new(None));
            cli::auth(Arc::clone(&oauth_result)).await;
        }
        Command::Playlists(opt) => cli::playlists(opt.user_id, opt.search).await,
        Command::Tracks(opt) => cli::tracks(opt.playlist_id).await,
        Command::Generate(opt) => {
            cli::generate(cli::GenerateArgs {
                playlist_id: opt.playlist_id,
                method: opt.method.into(),
                mood: opt.mood,
                title: opt.title,
                limit: opt.limit,
                upload: opt.upload.then(|| opt.ladder.into()),
            })
            .await
        }
        Command::Upload(opt) => {
            let source = match (opt.image_url, opt.file) {
                (Some(url), _) => cli::ImageSource::Url(url),
                (None, Some(path)) => cli::ImageSource::File(path),
                (None, None) => error!("Either --image-url or --file is required"),
            };
            cli::upload(opt.playlist_id, source, opt.ladder.into()).await
        }
        Command::Serve => cli::serve().await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
