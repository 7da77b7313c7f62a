//! Core library for a set of small media and document utilities.
//!
//! Each tool is a plain function with a typed result: calendar conversion to
//! a spreadsheet, size-targeted video compression and analysis through
//! ffmpeg/ffprobe, phone and e-mail extraction from PDF files, video container
//! conversion and directory zipping.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use utilkit_core::compress::{CompressOptions, compress_video_to_size};
//! use utilkit_core::external::{CrateFfprobeExecutor, SidecarSpawner, StdFsMetadataProvider};
//! use std::path::Path;
//!
//! let options = CompressOptions {
//!     target_size_gb: 0.5,
//!     use_hevc: true,
//!     ..Default::default()
//! };
//! let outcome = compress_video_to_size(
//!     &SidecarSpawner,
//!     &CrateFfprobeExecutor::new(),
//!     &StdFsMetadataProvider,
//!     Path::new("/videos/holiday.mov"),
//!     &options,
//! )
//! .unwrap();
//! println!("{}", outcome.path().display());
//! ```

pub mod archive;
pub mod calendar;
pub mod compress;
pub mod config;
pub mod contacts;
pub mod convert;
pub mod error;
pub mod external;
pub mod terminal;
pub mod utils;

// Re-exports for public API
pub use archive::{ArchiveSummary, zip_directory};
pub use calendar::{CalendarSummary, EventWindow, convert_calendar};
pub use compress::{CompressOptions, CompressOutcome, analyze_video, compress_video_to_size};
pub use config::EncoderSettings;
pub use contacts::{ExtractOptions, ExtractionSummary, PdfExtractor, extract_contacts};
pub use convert::{ConvertRequest, convert_video};
pub use error::{CoreError, CoreResult};
pub use utils::{format_bytes, format_duration, parse_ffmpeg_time};
