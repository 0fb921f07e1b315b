use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "vidrelay")]
#[command(author, version, about = "Telegram bot that downloads videos and relays them to a channel", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot (default)
    Run,

    /// Download a single URL with yt-dlp and print the resolved file path
    Download {
        /// URL to download
        url: String,

        /// Output name without extension
        #[arg(short, long)]
        output: String,

        /// Base downloader command line; built from YTDL_BIN and YTDL_FORMAT when omitted
        #[arg(short, long)]
        command: Option<String>,
    },

    /// Split a video into parts of at most --max-size-mb MiB
    Split {
        /// Video file to split
        path: String,

        /// Maximum part size in MiB
        #[arg(long, default_value_t = crate::core::config::upload::DEFAULT_PART_MAX_MB)]
        max_size_mb: u64,
    },

    /// Print the duration of a media file
    Probe {
        /// Media file to probe
        path: String,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
