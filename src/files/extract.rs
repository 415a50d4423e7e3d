use crate::error::{Error, Result};
use std::path::Path;

/// Extensions with a local text extractor.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "txt", "docx", "csv", "json"];

/// Extract text for local preview, never failing: problems come back as a
/// diagnostic string so one bad file in a batch doesn't abort the rest.
pub fn extract(data: &[u8], filename: &str) -> String {
    let ext = extension(filename);
    if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        return unsupported_message(&ext);
    }
    match try_extract(data, filename) {
        Ok(text) => text,
        Err(Error::InvalidFormat(msg)) => format!("Error: {}", msg),
        Err(e) => format!("Error reading file: {}", e),
    }
}

/// Read `path` and [`extract`] it.
pub fn extract_path(path: &Path) -> String {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    match std::fs::read(path) {
        Ok(data) => extract(&data, &filename),
        Err(e) => format!("Error reading file: {}", e),
    }
}

/// Extract text from a file based on its extension (case-insensitive).
pub fn try_extract(data: &[u8], filename: &str) -> Result<String> {
    let ext = extension(filename);
    tracing::debug!("extracting {} ({} bytes) as .{}", filename, data.len(), ext);

    match ext.as_str() {
        "txt" => std::str::from_utf8(data)
            .map(str::to_string)
            .map_err(|e| Error::InvalidFormat(format!("text is not valid UTF-8 - {}", e))),
        "pdf" => extract_pdf(data),
        "docx" => extract_docx(data),
        "csv" => extract_csv(data),
        "json" => extract_json(data),
        _ => Err(Error::InvalidFormat(unsupported_message(&ext))),
    }
}

pub fn is_supported(filename: &str) -> bool {
    SUPPORTED_EXTENSIONS.contains(&extension(filename).as_str())
}

/// Lower-cased extension without the dot, empty when there is none.
pub fn extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn unsupported_message(ext: &str) -> String {
    if ext.is_empty() {
        "Unsupported file type: (no extension)".to_string()
    } else {
        format!("Unsupported file type: .{}", ext)
    }
}

fn extract_json(data: &[u8]) -> Result<String> {
    let value: serde_json::Value = serde_json::from_slice(data)
        .map_err(|e| Error::InvalidFormat(format!("Invalid JSON format - {}", e)))?;
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Header row then data rows, columns padded to a shared width.
fn extract_csv(data: &[u8]) -> Result<String> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(data);

    let mut rows: Vec<Vec<String>> = Vec::new();
    let headers = reader
        .headers()
        .map_err(|e| Error::InvalidFormat(format!("Invalid CSV - {}", e)))?;
    if !headers.is_empty() {
        rows.push(headers.iter().map(str::to_string).collect());
    }
    for record in reader.records() {
        let record = record.map_err(|e| Error::InvalidFormat(format!("Invalid CSV - {}", e)))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let lines: Vec<String> = rows
        .iter()
        .map(|row| {
            let cells: Vec<String> = (0..columns)
                .map(|i| {
                    let cell = row.get(i).map(String::as_str).unwrap_or("");
                    let pad = widths[i].saturating_sub(cell.chars().count());
                    format!("{}{}", cell, " ".repeat(pad))
                })
                .collect();
            cells.join(" | ").trim_end().to_string()
        })
        .collect();
    Ok(lines.join("\n"))
}

/// Body paragraphs in document order, one per line.
fn extract_docx(data: &[u8]) -> Result<String> {
    let doc = docx_rs::read_docx(data)
        .map_err(|e| Error::InvalidFormat(format!("Failed to parse DOCX - {}", e)))?;

    let paragraphs: Vec<String> = doc
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            docx_rs::DocumentChild::Paragraph(para) => Some(paragraph_text(para)),
            _ => None,
        })
        .collect();
    Ok(paragraphs.join("\n"))
}

fn paragraph_text(para: &docx_rs::Paragraph) -> String {
    let mut out = String::new();
    for child in &para.children {
        match child {
            docx_rs::ParagraphChild::Run(run) => push_run_text(run, &mut out),
            docx_rs::ParagraphChild::Hyperlink(link) => {
                for inner in &link.children {
                    if let docx_rs::ParagraphChild::Run(run) = inner {
                        push_run_text(run, &mut out);
                    }
                }
            }
            _ => {}
        }
    }
    out
}

fn push_run_text(run: &docx_rs::Run, out: &mut String) {
    for child in &run.children {
        match child {
            docx_rs::RunChild::Text(text) => out.push_str(&text.text),
            docx_rs::RunChild::Tab(_) => out.push('\t'),
            _ => {}
        }
    }
}

fn extract_pdf(data: &[u8]) -> Result<String> {
    #[cfg(feature = "pdf")]
    {
        // pdf-extract can panic on malformed fonts
        let pages = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(data))
            .map_err(|_| {
                tracing::warn!("PDF extraction panicked");
                Error::InvalidFormat("PDF extraction panicked - malformed document".to_string())
            })?
            .map_err(|e| Error::InvalidFormat(format!("PDF extraction failed - {}", e)))?;
        Ok(pages.join("\n"))
    }
    #[cfg(not(feature = "pdf"))]
    {
        let _ = data;
        Err(Error::InvalidFormat(
            "PDF support not compiled in - enable the `pdf` feature".to_string(),
        ))
    }
}

/// Guess MIME type from filename extension.
pub fn guess_mime_type(filename: &str) -> String {
    match extension(filename).as_str() {
        "txt" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "csv" => "text/csv",
        "json" => "application/json",
        "xml" => "application/xml",
        "html" | "htm" => "text/html",
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
    .to_string()
}
