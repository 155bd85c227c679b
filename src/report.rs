//! PDF report: cover page with the inputs, then one page per operation.
//!
//! PDF generation via `printpdf`. Every image is first re-encoded to a JPEG
//! file in a scratch directory and embedded by decoding that file. The
//! scratch directory (JPEGs and the PDF itself) is removed before `build`
//! returns, whether it succeeded or not.
//!
//! Geometry is expressed in PDF points on a US Letter page with the origin at
//! the bottom-left corner, and converted to `Mm` only at the printpdf calls.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, RgbImage};
use printpdf::image_crate::codecs::jpeg::JpegDecoder;
use printpdf::{BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use tracing::{debug, info, warn};

use crate::config::REPORT_TITLE;
use crate::models::{Inputs, Operation, Parameter, ResultSet};

pub const PDF_MIME: &str = "application/pdf";

// ─── Page geometry (points) ───────────────────────────────────────────────────

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 50.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const SLOT_GAP: f32 = 12.0;
const MM_PER_PT: f32 = 25.4 / 72.0;

const TITLE_SIZE: f32 = 16.0;
const HEADING_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 12.0;
const CAPTION_SIZE: f32 = 10.0;

/// Cover page image band: bottom edge and height.
const COVER_BAND_BOTTOM: f32 = PAGE_HEIGHT - 340.0;
const COVER_BAND_HEIGHT: f32 = 190.0;

/// Operation page image band.
const RESULT_BAND_BOTTOM: f32 = PAGE_HEIGHT - 300.0;
const RESULT_BAND_HEIGHT: f32 = 180.0;

/// Embedding at 72 dpi makes one pixel one point before scaling.
const EMBED_DPI: f32 = 72.0;

const DEFAULT_JPEG_QUALITY: u8 = 90;

fn mm(points: f32) -> Mm {
    Mm(points * MM_PER_PT)
}

// ─── Types ────────────────────────────────────────────────────────────────────

/// What goes into a report. Borrowed from the processing result.
#[derive(Debug, Clone, Copy)]
pub struct ReportContent<'a> {
    pub name: &'a str,
    /// Registration number; also names the download.
    pub identifier: &'a str,
    pub inputs: &'a Inputs,
    pub parameter: Option<Parameter>,
    pub results: &'a ResultSet,
}

/// Finished document.
#[derive(Debug, Clone)]
pub struct Report {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub file_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding failed: {0}")]
    Encode(String),
    #[error("Image embedding failed: {0}")]
    Embed(String),
    #[error("PDF error: {0}")]
    Pdf(String),
}

/// Rectangle on the page, bottom-left origin, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Where and how large an image lands inside a slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

/// `{identifier}_image_processing.pdf`, with anything outside
/// `[A-Za-z0-9_-]` replaced by `_`.
pub fn report_file_name(identifier: &str) -> String {
    let safe: String = identifier
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe = if safe.is_empty() { "report".to_string() } else { safe };
    format!("{safe}_image_processing.pdf")
}

// ─── Layout helpers ───────────────────────────────────────────────────────────

/// Split a horizontal band into `count` equal slots separated by `SLOT_GAP`.
pub fn split_band(count: usize, left: f32, bottom: f32, width: f32, height: f32) -> Vec<Slot> {
    if count == 0 {
        return Vec::new();
    }
    let gaps = SLOT_GAP * (count - 1) as f32;
    let slot_width = (width - gaps) / count as f32;
    (0..count)
        .map(|i| Slot {
            x: left + i as f32 * (slot_width + SLOT_GAP),
            y: bottom,
            width: slot_width,
            height,
        })
        .collect()
}

/// Scale an image of `width`×`height` pixels (one pixel = one point) to fit
/// `slot` with its aspect ratio kept, centred in the slot.
pub fn fit_into(width: u32, height: u32, slot: Slot) -> Placement {
    let w = width.max(1) as f32;
    let h = height.max(1) as f32;
    let scale = (slot.width / w).min(slot.height / h);
    Placement {
        x: slot.x + (slot.width - w * scale) / 2.0,
        y: slot.y + (slot.height - h * scale) / 2.0,
        scale,
    }
}

// ─── Builder ──────────────────────────────────────────────────────────────────

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// JPEG written to the scratch directory, with its pixel size.
struct Staged {
    path: PathBuf,
    width: u32,
    height: u32,
}

#[derive(Debug, Clone)]
pub struct ReportBuilder {
    jpeg_quality: u8,
    scratch_root: Option<PathBuf>,
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            scratch_root: None,
        }
    }
}

impl ReportBuilder {
    pub fn new(jpeg_quality: u8) -> Self {
        Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
            scratch_root: None,
        }
    }

    /// Create scratch directories under `root` instead of the system temp dir.
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    /// Lay out and serialize the report.
    pub fn build(&self, content: &ReportContent<'_>) -> Result<Report, ReportError> {
        let report = self.with_scratch(|dir| self.build_in(dir, content))?;
        info!(
            pages = report.page_count,
            size = report.bytes.len(),
            file = %report.file_name,
            "Report generated"
        );
        Ok(report)
    }

    /// Run `f` inside a fresh scratch directory, removed afterwards whatever
    /// `f` returned.
    fn with_scratch<T>(
        &self,
        f: impl FnOnce(&Path) -> Result<T, ReportError>,
    ) -> Result<T, ReportError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("pixelcalc-report-");
        let scratch = match &self.scratch_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };

        let outcome = f(scratch.path());

        if let Err(e) = scratch.close() {
            warn!("Failed to remove report scratch directory: {e}");
        }
        outcome
    }

    fn build_in(&self, dir: &Path, content: &ReportContent<'_>) -> Result<Report, ReportError> {
        let originals = content
            .inputs
            .images()
            .into_iter()
            .enumerate()
            .map(|(i, img)| self.stage(img, &dir.join(format!("original_{}.jpg", i + 1))))
            .collect::<Result<Vec<_>, _>>()?;

        let mut results = Vec::with_capacity(content.results.len());
        for (op, img) in content.results.iter() {
            let staged = self.stage(img, &dir.join(format!("{}.jpg", op.file_stem())))?;
            results.push((op, staged));
        }

        let (doc, page1, layer1) =
            PdfDocument::new(REPORT_TITLE, mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Layer 1");
        let fonts = Fonts {
            regular: doc
                .add_builtin_font(BuiltinFont::Helvetica)
                .map_err(|e| ReportError::Pdf(format!("PDF font error: {e}")))?,
            bold: doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(|e| ReportError::Pdf(format!("PDF font error: {e}")))?,
        };

        let cover = doc.get_page(page1).get_layer(layer1);
        draw_cover(&cover, &fonts, content, &originals)?;
        let mut page_count = 1;

        for (op, staged) in &results {
            let (page, layer) = doc.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Layer 1");
            let layer = doc.get_page(page).get_layer(layer);
            draw_operation_page(&layer, &fonts, *op, content.parameter, &originals, staged)?;
            page_count += 1;
        }

        let pdf_path = dir.join("report.pdf");
        {
            let mut writer = BufWriter::new(File::create(&pdf_path)?);
            doc.save(&mut writer)
                .map_err(|e| ReportError::Pdf(format!("PDF save error: {e}")))?;
            writer.flush()?;
        }
        let bytes = std::fs::read(&pdf_path)?;

        Ok(Report {
            bytes,
            page_count,
            file_name: report_file_name(content.identifier),
        })
    }

    fn stage(&self, img: &RgbImage, path: &Path) -> Result<Staged, ReportError> {
        let mut writer = BufWriter::new(File::create(path)?);
        JpegEncoder::new_with_quality(&mut writer, self.jpeg_quality)
            .encode(img.as_raw(), img.width(), img.height(), ColorType::Rgb8)
            .map_err(|e| ReportError::Encode(e.to_string()))?;
        writer.flush()?;
        debug!(path = %path.display(), "Staged JPEG");

        Ok(Staged {
            path: path.to_path_buf(),
            width: img.width(),
            height: img.height(),
        })
    }
}

/// Builtin PDF fonts only cover Latin-1; anything else would vanish from the
/// page, so it is replaced with `?` and logged.
fn builtin_encodable(text: &str) -> String {
    let mut replaced = 0usize;
    let out: String = text
        .chars()
        .map(|c| {
            if matches!(c, ' '..='~' | '\u{A0}'..='\u{FF}') {
                c
            } else {
                replaced += 1;
                '?'
            }
        })
        .collect();
    if replaced > 0 {
        warn!(replaced, "Characters outside the builtin font encoding replaced in report text");
    }
    out
}

// ─── Page drawing ─────────────────────────────────────────────────────────────

fn draw_title(layer: &PdfLayerReference, fonts: &Fonts) {
    layer.use_text(
        REPORT_TITLE,
        TITLE_SIZE,
        mm(MARGIN),
        mm(PAGE_HEIGHT - 50.0),
        &fonts.bold,
    );
}

fn draw_cover(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    content: &ReportContent<'_>,
    originals: &[Staged],
) -> Result<(), ReportError> {
    draw_title(layer, fonts);

    let left = mm(MARGIN);
    let name = builtin_encodable(content.name);
    layer.use_text(
        format!("Name: {name}"),
        BODY_SIZE,
        left,
        mm(PAGE_HEIGHT - 80.0),
        &fonts.regular,
    );
    layer.use_text(
        format!("Registration Number: {}", content.identifier),
        BODY_SIZE,
        left,
        mm(PAGE_HEIGHT - 100.0),
        &fonts.regular,
    );

    let heading = if originals.len() > 1 {
        "Original Images:"
    } else {
        "Original Image:"
    };
    layer.use_text(heading, BODY_SIZE, left, mm(PAGE_HEIGHT - 130.0), &fonts.regular);

    let slots = split_band(
        originals.len(),
        MARGIN,
        COVER_BAND_BOTTOM,
        CONTENT_WIDTH,
        COVER_BAND_HEIGHT,
    );
    for (staged, slot) in originals.iter().zip(slots) {
        embed(layer, staged, slot)?;
    }

    let mut y = COVER_BAND_BOTTOM - 25.0;
    layer.use_text(
        format!("Generated: {}", chrono::Local::now().format("%Y-%m-%d %H:%M")),
        CAPTION_SIZE,
        left,
        mm(y),
        &fonts.regular,
    );
    y -= 15.0;

    let operations: Vec<&str> = content.results.operations().into_iter().map(Operation::label).collect();
    if !operations.is_empty() {
        layer.use_text(
            format!("Operations: {}", operations.join(", ")),
            CAPTION_SIZE,
            left,
            mm(y),
            &fonts.regular,
        );
        y -= 15.0;
    }
    if let Some(parameter) = content.parameter {
        layer.use_text(parameter.describe(), CAPTION_SIZE, left, mm(y), &fonts.regular);
    }

    Ok(())
}

fn draw_operation_page(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    op: Operation,
    parameter: Option<Parameter>,
    originals: &[Staged],
    result: &Staged,
) -> Result<(), ReportError> {
    draw_title(layer, fonts);

    let left = mm(MARGIN);
    layer.use_text(
        format!("{op} Result:"),
        HEADING_SIZE,
        left,
        mm(PAGE_HEIGHT - 80.0),
        &fonts.regular,
    );
    if let Some(parameter) = parameter {
        layer.use_text(
            parameter.describe(),
            CAPTION_SIZE,
            left,
            mm(PAGE_HEIGHT - 100.0),
            &fonts.regular,
        );
    }

    let mut panels: Vec<(&Staged, String)> = originals
        .iter()
        .enumerate()
        .map(|(i, staged)| {
            let caption = match (originals.len(), i) {
                (1, _) => "Original".to_string(),
                (_, i) => format!("Original {}", i + 1),
            };
            (staged, caption)
        })
        .collect();
    panels.push((result, format!("{op} Result")));

    let slots = split_band(
        panels.len(),
        MARGIN,
        RESULT_BAND_BOTTOM,
        CONTENT_WIDTH,
        RESULT_BAND_HEIGHT,
    );
    for ((staged, caption), slot) in panels.iter().zip(slots) {
        embed(layer, staged, slot)?;
        layer.use_text(
            caption.as_str(),
            CAPTION_SIZE,
            mm(slot.x),
            mm(slot.y - 15.0),
            &fonts.regular,
        );
    }

    Ok(())
}

/// Decode a staged JPEG from disk and place it inside `slot`.
fn embed(layer: &PdfLayerReference, staged: &Staged, slot: Slot) -> Result<(), ReportError> {
    let reader = BufReader::new(File::open(&staged.path)?);
    let decoder = JpegDecoder::new(reader).map_err(|e| ReportError::Embed(e.to_string()))?;
    let image = Image::try_from(decoder).map_err(|e| ReportError::Embed(e.to_string()))?;

    let placement = fit_into(staged.width, staged.height, slot);
    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(mm(placement.x)),
            translate_y: Some(mm(placement.y)),
            scale_x: Some(placement.scale),
            scale_y: Some(placement.scale),
            dpi: Some(EMBED_DPI),
            ..Default::default()
        },
    );
    Ok(())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
