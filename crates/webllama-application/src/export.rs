//! Archive export.
//!
//! Packages the working buffers as a deployable zip: `index.html`,
//! `style.css`, `script.js` when present, and a generated `README.md`
//! naming the prompt and file manifest.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use webllama_core::generation::{fallback_css, fallback_html};
use webllama_core::{FileSet, Result, WebllamaError};
use zip::{CompressionMethod, ZipWriter, write::FileOptions};

/// Exported archives are named `webllama-project-<epoch-ms>.zip`.
pub const ARCHIVE_PREFIX: &str = "webllama-project-";

/// Builds the export archive under `dest_dir`.
///
/// Refused when all three buffers are empty. Archive construction runs on
/// the blocking pool so the event loop stays responsive.
///
/// # Returns
///
/// The path of the written archive.
pub async fn export_archive(prompt: &str, files: &FileSet, dest_dir: &Path) -> Result<PathBuf> {
    if files.is_empty() {
        return Err(WebllamaError::validation(
            "No website to export. Generate a website first.",
        ));
    }

    let archive_path = dest_dir.join(format!(
        "{ARCHIVE_PREFIX}{}.zip",
        chrono::Local::now().timestamp_millis()
    ));

    let prompt = prompt.to_string();
    let files = files.clone();
    let path = archive_path.clone();
    tokio::task::spawn_blocking(move || build_archive(&prompt, &files, &path))
        .await
        .map_err(|err| WebllamaError::internal(format!("Archive task failed: {err}")))??;

    Ok(archive_path)
}

fn build_archive(prompt: &str, files: &FileSet, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(dest)?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::<()>::default().compression_method(CompressionMethod::Deflated);

    let html = if files.html.is_empty() {
        fallback_html()
    } else {
        files.html.clone()
    };
    let css = if files.css.is_empty() {
        fallback_css()
    } else {
        files.css.clone()
    };

    write_entry(&mut zip, "index.html", &html, options)?;
    write_entry(&mut zip, "style.css", &css, options)?;
    if !files.js.is_empty() {
        write_entry(&mut zip, "script.js", &files.js, options)?;
    }
    write_entry(&mut zip, "README.md", &readme(prompt, files), options)?;

    zip.finish()
        .map_err(|err| WebllamaError::data_access(format!("Failed to finish archive: {err}")))?;
    Ok(())
}

fn write_entry(
    zip: &mut ZipWriter<File>,
    name: &str,
    content: &str,
    options: FileOptions<'_, ()>,
) -> Result<()> {
    zip.start_file(name, options)
        .map_err(|err| WebllamaError::data_access(format!("Failed to add {name}: {err}")))?;
    zip.write_all(content.as_bytes())?;
    Ok(())
}

fn readme(prompt: &str, files: &FileSet) -> String {
    let script_line = if files.js.is_empty() {
        String::new()
    } else {
        "- script.js - JavaScript functionality\n".to_string()
    };

    format!(
        "# Generated with WebLlama\n\n\
         Generated on: {date}\n\
         Prompt: {prompt}\n\n\
         ## Files Included:\n\
         - index.html - Main HTML structure\n\
         - style.css - CSS styling\n\
         {script_line}\n\
         ## To use:\n\
         1. Extract all files to a folder\n\
         2. Open index.html in a web browser\n\
         3. Customize as needed\n",
        date = chrono::Local::now().format("%d/%m/%Y"),
    )
}
