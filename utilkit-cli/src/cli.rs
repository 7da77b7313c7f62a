// utilkit-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "utilkit: small media and document utilities",
    long_about = "Calendar conversion, size-targeted video compression, PDF contact extraction, video conversion and directory zipping."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output for troubleshooting
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write the log to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Converts an iCalendar (.ics) file into an .xlsx spreadsheet
    Calendar(CalendarArgs),
    /// Compresses a video towards a target file size
    Compress(CompressArgs),
    /// Prints video details and compression recommendations
    Analyze(AnalyzeArgs),
    /// Extracts phone numbers and e-mail addresses from grouped PDF files
    ExtractContacts(ExtractArgs),
    /// Converts a video into another container format
    Convert(ConvertArgs),
    /// Zips a directory
    Zip(ZipArgs),
}

#[derive(Args, Debug)]
pub struct CalendarArgs {
    /// Input .ics file, optionally followed by the output name (defaults to output.xlsx).
    /// Unquoted names containing spaces are joined back together.
    #[arg(required = true, num_args = 1.., value_name = "INPUT [OUTPUT]")]
    pub names: Vec<String>,
}

#[derive(Args, Debug)]
pub struct CompressArgs {
    /// Input video file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output path (defaults to <stem>_compressed[...].mp4 next to the input)
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Target size in GB
    #[arg(short, long, value_name = "GB", default_value_t = 1.0, env = "UTILKIT_TARGET_SIZE_GB")]
    pub size: f64,

    /// Only analyze the video and print recommendations
    #[arg(short, long)]
    pub analyze: bool,

    /// Downscale to 1080p (caps the bitrate)
    #[arg(long = "1080p")]
    pub downscale: bool,

    /// Encode with H.265 instead of H.264
    #[arg(long)]
    pub hevc: bool,

    /// Reduce the frame rate to 30 fps
    #[arg(long = "30fps")]
    pub fps30: bool,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Input video file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Print the video information as JSON instead of a report
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Directory whose subdirectories hold the PDF files of each group
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Directory receiving one <group>.txt per group
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Do not delete the contents of the input directory afterwards
    /// (also enabled by UTILKIT_KEEP_INPUT)
    #[arg(long)]
    pub keep_input: bool,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input video (prompted for when omitted)
    #[arg(value_name = "INPUT")]
    pub input: Option<String>,

    /// Output container format, e.g. mp4 or mkv (prompted for when omitted)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Output path (prompted for when omitted)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,
}

#[derive(Args, Debug)]
pub struct ZipArgs {
    /// Directory to compress
    #[arg(value_name = "SOURCE", env = "UTILKIT_ZIP_SOURCE")]
    pub source: PathBuf,

    /// Zip file to write
    #[arg(value_name = "DEST", env = "UTILKIT_ZIP_DEST")]
    pub destination: PathBuf,
}
