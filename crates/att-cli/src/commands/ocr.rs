//! Read a timetable from a photo and optionally store it.
//!
//! Recognition problems are reported as warnings and leave stored data
//! untouched. The OCR request finishes before the data directory is locked.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use att_core::Day;
use att_ocr::{OcrSpaceClient, TextRecognizer, extract_timetable};
use att_store::Tracker;
use clap::Args;

use crate::Config;

const SUPPORTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Debug, Args)]
pub struct OcrArgs {
    /// Image file (jpg, jpeg or png).
    pub image: PathBuf,

    /// Only read text after this group/section marker (e.g. A).
    #[arg(long)]
    pub section: Option<String>,

    /// Replace the stored schedule of every parsed day.
    #[arg(long)]
    pub save: bool,

    /// With --save, register unknown subjects instead of skipping them.
    #[arg(long, requires = "save")]
    pub create_missing: bool,
}

pub fn run<W: Write>(
    writer: &mut W,
    tracker: &Tracker,
    config: &Config,
    args: &OcrArgs,
) -> Result<()> {
    let file_name = image_file_name(&args.image)?;
    let image = fs::read(&args.image)
        .with_context(|| format!("failed to read {}", args.image.display()))?;

    let Some(api_key) = config
        .ocr_api_key
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
    else {
        writeln!(
            writer,
            "warning: missing OCR API key (set ATT_OCR_API_KEY or ocr_api_key in config.toml)"
        )?;
        return Ok(());
    };

    let client = match OcrSpaceClient::new(api_key, config.ocr_timeout()) {
        Ok(client) => client.with_language(config.ocr_language.as_str()),
        Err(err) => {
            writeln!(writer, "warning: {err}")?;
            return Ok(());
        }
    };

    recognize_and_import(writer, tracker, config, args, &client, &image, &file_name)
}

/// Recognizes `image`, prints what was read, and imports it when `--save` is set.
pub fn recognize_and_import<W: Write, R: TextRecognizer + Sync>(
    writer: &mut W,
    tracker: &Tracker,
    config: &Config,
    args: &OcrArgs,
    recognizer: &R,
    image: &[u8],
    file_name: &str,
) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    let extracted = runtime.block_on(extract_timetable(
        recognizer,
        image,
        file_name,
        args.section.as_deref(),
        &config.days,
    ));

    let (text, schedule) = match extracted {
        Ok(extracted) => extracted,
        Err(err) => {
            tracing::warn!(error = %err, "timetable recognition failed");
            writeln!(writer, "warning: {err}")?;
            return Ok(());
        }
    };

    writeln!(writer, "Recognized text:")?;
    for line in text.lines() {
        writeln!(writer, "  {}", line.trim_end())?;
    }
    writeln!(writer)?;
    writeln!(writer, "Parsed timetable:")?;
    writeln!(
        writer,
        "{}",
        serde_json::to_string_pretty(&schedule).context("failed to serialize timetable")?
    )?;

    if args.save {
        save(writer, tracker, config, &schedule, args.create_missing)
    } else {
        writeln!(writer, "Run again with --save to store this timetable.")?;
        Ok(())
    }
}

fn save<W: Write>(
    writer: &mut W,
    tracker: &Tracker,
    config: &Config,
    schedule: &BTreeMap<Day, Vec<String>>,
    create_missing: bool,
) -> Result<()> {
    let report =
        tracker.import_timetable(schedule, create_missing.then_some(config.default_target))?;

    writeln!(writer, "Saved timetable for {} day(s).", report.days)?;
    if !report.created.is_empty() {
        writeln!(
            writer,
            "Registered new subject(s): {}",
            report.created.join(", ")
        )?;
    }
    if !report.skipped.is_empty() {
        writeln!(
            writer,
            "warning: skipped unregistered subject(s): {} (add them first or use --create-missing)",
            report.skipped.join(", ")
        )?;
    }
    Ok(())
}

/// File name sent to the OCR service; its extension tells it the format.
fn image_file_name(path: &Path) -> Result<String> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        bail!(
            "unsupported image type '{}': expected one of {}",
            path.display(),
            SUPPORTED_EXTENSIONS.join(", ")
        );
    }
    Ok(path
        .file_name()
        .and_then(|name| name.to_str())
        .map_or_else(|| format!("timetable.{extension}"), str::to_string))
}
