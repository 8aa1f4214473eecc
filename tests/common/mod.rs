use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use worksheet_pdf::{ExportOptions, RecordKind};

/// Fixed date and uncompressed streams so content can be searched as text.
/// Assumes WORKSHEET_PDF_FONT is unset: embedded faces show glyph ids, not text.
pub fn options() -> ExportOptions {
    ExportOptions {
        printed_on: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        compress: false,
        ..Default::default()
    }
}

pub fn kind_for_group(group: &str) -> Option<RecordKind> {
    match group {
        "worksheet" => Some(RecordKind::Worksheet),
        "narrative" => Some(RecordKind::Narrative),
        "questionnaire" => Some(RecordKind::Questionnaire),
        "aggregate" => Some(RecordKind::Aggregate),
        _ => None,
    }
}

pub fn group_name(fixture: &Path) -> String {
    fixture
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_string()
}

/// Output directory: tests/output/<group>/<case>/
pub fn output_dir(fixture: &Path) -> PathBuf {
    let case = fixture.file_stem().unwrap().to_string_lossy();
    PathBuf::from("tests/output")
        .join(group_name(fixture))
        .join(case.as_ref())
}

pub fn display_name(fixture: &Path) -> String {
    format!(
        "{}/{}",
        group_name(fixture),
        fixture.file_stem().unwrap().to_string_lossy()
    )
}

/// JSON records under tests/fixtures/<kind>/. Filter with WORKSHEET_CASE.
pub fn discover_fixtures() -> io::Result<Vec<PathBuf>> {
    let case_filter = std::env::var("WORKSHEET_CASE").ok();
    let mut fixtures = Vec::new();
    for group_entry in fs::read_dir("tests/fixtures")? {
        let group = group_entry?.path();
        if !group.is_dir() {
            continue;
        }
        for entry in fs::read_dir(&group)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let stem = path.file_stem().and_then(|n| n.to_str()).unwrap_or("");
            if case_filter.as_deref().is_none_or(|f| f == stem) {
                fixtures.push(path);
            }
        }
    }
    fixtures.sort();
    Ok(fixtures)
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + from)
}

pub fn count(haystack: &[u8], needle: &str) -> usize {
    let needle = needle.as_bytes();
    let mut n = 0;
    let mut at = 0;
    while let Some(i) = find(haystack, needle, at) {
        n += 1;
        at = i + needle.len();
    }
    n
}

fn show_op(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        if matches!(c, '(' | ')' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("({escaped}) Tj")
}

/// How many times `text` is drawn as one text-show operation.
pub fn shows(pdf: &[u8], text: &str) -> usize {
    count(pdf, &show_op(text))
}

/// Start point of the first line showing `text`, read from the `Td` right
/// before it. Only the first chunk of a line is positioned absolutely.
pub fn text_origin(pdf: &[u8], text: &str) -> Option<(f32, f32)> {
    let at = find(pdf, show_op(text).as_bytes(), 0)?;
    let window = String::from_utf8_lossy(&pdf[at.saturating_sub(120)..at]);
    let td = window.rfind(" Td")?;
    let line_start = window[..td].rfind('\n').map_or(0, |i| i + 1);
    let mut nums = window[line_start..td].split_whitespace().map(str::parse::<f32>);
    match (nums.next(), nums.next()) {
        (Some(Ok(x)), Some(Ok(y))) => Some((x, y)),
        _ => None,
    }
}

pub fn page_count(pdf: &[u8]) -> usize {
    count(pdf, "/MediaBox")
}

/// Every Flate stream in the file, inflated.
pub fn inflate_streams(pdf: &[u8]) -> Vec<Vec<u8>> {
    let mut out = Vec::new();
    let mut at = 0;
    while let Some(start) = find(pdf, b"stream\n", at) {
        let data_start = start + b"stream\n".len();
        let Some(end) = find(pdf, b"\nendstream", data_start) else {
            break;
        };
        if let Ok(data) = miniz_oxide::inflate::decompress_to_vec_zlib(&pdf[data_start..end]) {
            out.push(data);
        }
        at = end + b"\nendstream".len();
    }
    out
}
