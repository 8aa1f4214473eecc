//! Masthead and footer overlay, plus the page-number stamp applied once the
//! page count is final.

use chrono::NaiveDate;
use pdf_writer::{Content, Name};

use crate::error::Error;
use crate::fonts::FontSet;
use crate::options::{PageGeometry, PageNumberStyle};

use super::palette::{INK, MUTED, RULE};
use super::text::{self, Align, Span};
use super::{ImageXObject, Overlay, hline};

pub(crate) const BRAND_MARK: &str = "Im1";

const BAND_PADDING: f32 = 24.0;
const MARK_HEIGHT: f32 = 36.0;
const MARK_GAP: f32 = 10.0;
const RULE_GAP: f32 = 16.0;
const FOOTER_SIZE: f32 = 9.0;

pub(crate) struct Masthead {
    pub(crate) brand_name: String,
    pub(crate) subtitle: String,
    pub(crate) printed_on: NaiveDate,
    /// Display size of the brand mark, when one decoded.
    pub(crate) mark_size: Option<(f32, f32)>,
}

impl Masthead {
    pub(crate) fn into_overlay(self) -> Overlay {
        let printed = format!("Printed {}", self.printed_on.format("%B %-d, %Y"));
        Box::new(move |content: &mut Content, fonts: &mut FontSet, geometry: &PageGeometry| {
            draw_masthead(content, fonts, geometry, &self)?;
            draw_footer(content, fonts, geometry, &printed)
        })
    }
}

/// Decode the brand mark. An absent or unreadable mark is skipped, never fatal.
pub(crate) fn load_brand_mark(bytes: Option<&[u8]>) -> Option<(ImageXObject, (f32, f32))> {
    let Some(bytes) = bytes else {
        log::debug!("No brand mark configured; masthead drawn without it");
        return None;
    };
    match ImageXObject::decode(BRAND_MARK, bytes) {
        Ok(image) if image.width > 0 && image.height > 0 => {
            let w = MARK_HEIGHT * image.width as f32 / image.height as f32;
            Some((image, (w, MARK_HEIGHT)))
        }
        Ok(_) => {
            log::warn!("Brand mark has no pixels; skipping it");
            None
        }
        Err(e) => {
            log::warn!("Brand mark could not be decoded ({e}); skipping it");
            None
        }
    }
}

fn draw_masthead(
    content: &mut Content,
    fonts: &mut FontSet,
    g: &PageGeometry,
    masthead: &Masthead,
) -> Result<(), Error> {
    let band_top = g.page_height - BAND_PADDING;
    let mut text_x = g.margin_left;

    if let Some((w, h)) = masthead.mark_size {
        content.save_state();
        content.transform([w, 0.0, 0.0, h, g.margin_left, band_top - h]);
        content.x_object(Name(BRAND_MARK.as_bytes()));
        content.restore_state();
        text_x += w + MARK_GAP;
    }

    let width = (g.page_width - g.margin_right - text_x).max(1.0);
    let used = text::draw_text(
        content,
        fonts,
        &[Span::bold(&masthead.brand_name)],
        text_x,
        width,
        band_top,
        16.0,
        INK,
        Align::Left,
    )?;
    text::draw_text(
        content,
        fonts,
        &[Span::plain(&masthead.subtitle)],
        text_x,
        width,
        band_top - used,
        10.0,
        MUTED,
        Align::Left,
    )?;

    let rule_y = g.page_height - g.margin_top + RULE_GAP;
    hline(content, g.margin_left, g.page_width - g.margin_right, rule_y, RULE, 0.75);
    Ok(())
}

fn footer_top(g: &PageGeometry) -> f32 {
    g.margin_bottom - RULE_GAP - 6.0
}

fn draw_footer(
    content: &mut Content,
    fonts: &mut FontSet,
    g: &PageGeometry,
    printed: &str,
) -> Result<(), Error> {
    let rule_y = g.margin_bottom - RULE_GAP;
    hline(content, g.margin_left, g.page_width - g.margin_right, rule_y, RULE, 0.75);
    text::draw_text(
        content,
        fonts,
        &[Span::plain(printed)],
        g.margin_left,
        g.content_width(),
        footer_top(g),
        FOOTER_SIZE,
        MUTED,
        Align::Left,
    )?;
    Ok(())
}

pub(crate) fn page_label(style: PageNumberStyle, index: usize, total: usize) -> String {
    match style {
        PageNumberStyle::Plain => format!("Page {}", index + 1),
        PageNumberStyle::OfTotal => format!("Page {} of {}", index + 1, total),
    }
}

/// Right-aligned page number on the footer line of page `index` (0-based).
pub(crate) fn stamp_page_number(
    content: &mut Content,
    fonts: &mut FontSet,
    g: &PageGeometry,
    style: PageNumberStyle,
    index: usize,
    total: usize,
) -> Result<(), Error> {
    let label = page_label(style, index, total);
    text::draw_text(
        content,
        fonts,
        &[Span::plain(label)],
        g.margin_left,
        g.content_width(),
        footer_top(g),
        FOOTER_SIZE,
        MUTED,
        Align::Right,
    )?;
    Ok(())
}
