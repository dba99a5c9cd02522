use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "image-grab")]
#[command(about = "Downloads every image referenced by a web page")]
#[command(version)]
pub struct Args {
    /// Absolute http(s) URL of the page to scan
    pub url: String,

    /// Directory the images are saved into (created if missing)
    pub destination: PathBuf,

    /// JSON configuration file; command-line flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of concurrent downloads
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Only download image URLs matching this regex (repeatable)
    #[arg(long)]
    pub include: Vec<String>,

    /// Skip image URLs matching this regex (repeatable)
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Print the batch result as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}
