// ============================================================================
// utilkit-core/src/convert.rs
// ============================================================================
//
// CONVERT: Video Container Conversion
//
// Re-encodes a video into another container with fixed quality settings
// (H.264 CRF + AAC). Values the user did not pass on the command line are
// asked for interactively.
//
// AI-ASSISTANT-INFO: Interactive video format conversion on top of ffmpeg

use crate::config::{DEFAULT_CONVERT_FORMAT, EncoderSettings, H264_ENCODER};
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegSpawner, run_ffmpeg};
use crate::terminal;
use crate::utils::expand_user_path;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// What to convert, where to, and into which container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertRequest {
    pub input: String,
    pub format: String,
    pub output: Option<String>,
}

impl ConvertRequest {
    pub fn new(input: impl Into<String>, format: Option<&str>, output: Option<&str>) -> Self {
        let format = format
            .map(normalize_format)
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| DEFAULT_CONVERT_FORMAT.to_string());
        let output = output
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string);
        Self {
            input: input.into().trim().to_string(),
            format,
            output,
        }
    }
}

fn normalize_format(format: &str) -> String {
    format.trim().trim_start_matches('.').to_string()
}

fn prompt<R: BufRead, W: Write>(reader: &mut R, writer: &mut W, question: &str) -> CoreResult<String> {
    write!(writer, "{question}")?;
    writer.flush()?;
    let mut answer = String::new();
    reader.read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

/// Asks for every value that was not supplied up front.
///
/// A blank format means `mp4`; a blank output means "next to the input".
pub fn prompt_conversion_request<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    input: Option<&str>,
    format: Option<&str>,
    output: Option<&str>,
) -> CoreResult<ConvertRequest> {
    let input = match input {
        Some(value) => value.to_string(),
        None => prompt(reader, writer, "Input video: ")?,
    };
    if input.trim().is_empty() {
        return Err(CoreError::InputNotFound("no input video given".to_string()));
    }

    let format = match format {
        Some(value) => value.to_string(),
        None => prompt(
            reader,
            writer,
            &format!("Desired output format (default: {DEFAULT_CONVERT_FORMAT}): "),
        )?,
    };

    let output = match output {
        Some(value) => value.to_string(),
        None => prompt(
            reader,
            writer,
            "Desired output path (or press Enter to use default): ",
        )?,
    };

    Ok(ConvertRequest::new(input, Some(&format), Some(&output)))
}

/// ffmpeg arguments for a conversion.
pub fn conversion_args(input: &Path, output: &Path, encoder: &EncoderSettings) -> Vec<String> {
    vec![
        "-i".to_string(),
        input.to_string_lossy().into_owned(),
        "-c:v".to_string(),
        H264_ENCODER.to_string(),
        "-preset".to_string(),
        encoder.preset.clone(),
        "-crf".to_string(),
        encoder.convert_crf.to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        encoder.convert_audio_bitrate.clone(),
        "-y".to_string(),
        output.to_string_lossy().into_owned(),
    ]
}

/// Expands and absolutizes the input path, failing when no such file exists.
pub fn resolve_input(raw: &str) -> CoreResult<PathBuf> {
    let input = expand_user_path(raw)?;
    if !input.is_file() {
        let cwd = std::env::current_dir()
            .map(|d| d.display().to_string())
            .unwrap_or_else(|_| "<unknown>".to_string());
        return Err(CoreError::InputNotFound(format!(
            "Input file '{}' not found. Please check the path and ensure the file exists. Current working directory: {cwd}",
            input.display()
        )));
    }
    Ok(input)
}

/// Converts the requested video and returns the path of the result.
///
/// When the input already has the requested extension (case-insensitive)
/// nothing is run and the input path is returned.
pub fn convert_video<S: FfmpegSpawner>(
    spawner: &S,
    request: &ConvertRequest,
    encoder: &EncoderSettings,
) -> CoreResult<PathBuf> {
    let input = resolve_input(&request.input)?;

    let input_ext = input
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if input_ext == request.format.to_lowercase() {
        terminal::print_warning(&format!("File already in '{}' format.", request.format));
        return Ok(input);
    }

    let output = match request.output.as_deref() {
        Some(path) => expand_user_path(path)?,
        None => input.with_extension(&request.format),
    };
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    terminal::print_processing(&format!("Converting to {}", request.format));
    terminal::print_status("Input", &input.display().to_string(), false);
    terminal::print_status("Output", &output.display().to_string(), false);

    let args = conversion_args(&input, &output, encoder);
    run_ffmpeg(spawner, &args, "Converting", None).map_err(|e| match e {
        CoreError::CommandFailed(cmd, _, stderr) => CoreError::Conversion(format!(
            "Error during video conversion:\n- Command: {cmd}\n- Error Output: {stderr}\n- Possible causes:\n  1. Incompatible input file\n  2. Insufficient permissions\n  3. Corrupted video file"
        )),
        other => other,
    })?;

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_prompts_for_everything() {
        let mut reader = Cursor::new("  ~/clip.mov \n\n\n");
        let mut writer = Vec::new();

        let request = prompt_conversion_request(&mut reader, &mut writer, None, None, None).unwrap();

        assert_eq!(request, ConvertRequest::new("~/clip.mov", None, None));
        assert_eq!(request.format, "mp4");
        assert_eq!(request.output, None);
        let shown = String::from_utf8(writer).unwrap();
        assert!(shown.contains("Input video: "));
        assert!(shown.contains("Desired output format (default: mp4): "));
        assert!(shown.contains("Desired output path (or press Enter to use default): "));
    }

    #[test]
    fn test_prompts_only_for_missing_values() {
        let mut reader = Cursor::new("/tmp/out.webm\n");
        let mut writer = Vec::new();

        let request =
            prompt_conversion_request(&mut reader, &mut writer, Some("in.avi"), Some(".webm"), None)
                .unwrap();

        assert_eq!(request.input, "in.avi");
        assert_eq!(request.format, "webm");
        assert_eq!(request.output.as_deref(), Some("/tmp/out.webm"));
        let shown = String::from_utf8(writer).unwrap();
        assert!(!shown.contains("Input video"));
        assert!(!shown.contains("Desired output format"));
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let mut reader = Cursor::new("\n");
        let mut writer = Vec::new();
        let err = prompt_conversion_request(&mut reader, &mut writer, None, None, None).unwrap_err();
        assert!(matches!(err, CoreError::InputNotFound(_)));
    }

    #[test]
    fn test_conversion_args() {
        let args = conversion_args(
            Path::new("/v/in.avi"),
            Path::new("/v/in.mp4"),
            &EncoderSettings::default(),
        );
        assert_eq!(
            args.join(" "),
            "-i /v/in.avi -c:v libx264 -preset medium -crf 23 -c:a aac -b:a 192k -y /v/in.mp4"
        );
    }

    #[test]
    fn test_resolve_input() {
        let dir = tempfile::tempdir().unwrap();
        let clip = dir.path().join("clip.avi");
        std::fs::write(&clip, b"data").unwrap();
        assert_eq!(resolve_input(clip.to_str().unwrap()).unwrap(), clip);

        let err = resolve_input(dir.path().join("missing.avi").to_str().unwrap()).unwrap_err();
        assert!(matches!(err, CoreError::InputNotFound(_)));
        assert!(err.to_string().contains("not found"));
        assert!(err.to_string().contains("Current working directory"));
    }

    #[cfg(unix)]
    mod flow {
        use super::*;
        use crate::external::mocks::MockFfmpegSpawner;
        use ffmpeg_sidecar::event::FfmpegEvent;

        #[test]
        fn test_same_format_is_a_no_op() {
            let dir = tempfile::tempdir().unwrap();
            let input = dir.path().join("movie.MP4");
            std::fs::write(&input, b"data").unwrap();
            let spawner = MockFfmpegSpawner::new();

            let request = ConvertRequest::new(input.to_string_lossy(), Some("mp4"), None);
            let result = convert_video(&spawner, &request, &EncoderSettings::default()).unwrap();

            assert_eq!(result, input);
            assert!(spawner.received_calls().is_empty());
        }

        #[test]
        fn test_default_output_swaps_extension() {
            let dir = tempfile::tempdir().unwrap();
            let input = dir.path().join("movie.avi");
            std::fs::write(&input, b"data").unwrap();
            let spawner = MockFfmpegSpawner::new();
            spawner.push_success(Vec::new());

            let request = ConvertRequest::new(input.to_string_lossy(), Some("mkv"), None);
            let result = convert_video(&spawner, &request, &EncoderSettings::default()).unwrap();

            assert_eq!(result, dir.path().join("movie.mkv"));
            let calls = spawner.received_calls();
            assert_eq!(calls[0].last().map(String::as_str), result.to_str());
            assert!(calls[0].windows(2).any(|w| w[0] == "-crf" && w[1] == "23"));
        }

        #[test]
        fn test_explicit_output_creates_parent_dirs() {
            let dir = tempfile::tempdir().unwrap();
            let input = dir.path().join("movie.avi");
            std::fs::write(&input, b"data").unwrap();
            let output = dir.path().join("nested/deeper/result.mp4");
            let spawner = MockFfmpegSpawner::new();
            spawner.push_success(Vec::new());

            let request = ConvertRequest::new(
                input.to_string_lossy(),
                Some("mp4"),
                Some(&output.to_string_lossy()),
            );
            let result = convert_video(&spawner, &request, &EncoderSettings::default()).unwrap();

            assert_eq!(result, output);
            assert!(dir.path().join("nested/deeper").is_dir());
        }

        #[test]
        fn test_missing_input_names_working_directory() {
            let spawner = MockFfmpegSpawner::new();
            let request = ConvertRequest::new("/definitely/not/here.avi", None, None);
            let err = convert_video(&spawner, &request, &EncoderSettings::default()).unwrap_err();
            assert!(err.to_string().contains("Current working directory"));
        }

        #[test]
        fn test_failure_reports_command_and_causes() {
            let dir = tempfile::tempdir().unwrap();
            let input = dir.path().join("broken.avi");
            std::fs::write(&input, b"data").unwrap();
            let spawner = MockFfmpegSpawner::new();
            spawner.push_exit_failure(
                vec![FfmpegEvent::Error("Invalid data found when processing input".to_string())],
                1,
            );

            let request = ConvertRequest::new(input.to_string_lossy(), Some("mp4"), None);
            let err = convert_video(&spawner, &request, &EncoderSettings::default()).unwrap_err();

            let message = err.to_string();
            assert!(matches!(err, CoreError::Conversion(_)));
            assert!(message.contains("-c:v libx264"));
            assert!(message.contains("Invalid data found when processing input"));
            assert!(message.contains("Corrupted video file"));
        }
    }
}
