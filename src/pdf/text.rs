use pdf_writer::{Content, Name, Str};

use crate::error::Error;
use crate::fonts::FontSet;

use super::fill_rgb;

/// Line pitch as a multiple of the font size.
pub(crate) const LEADING: f32 = 1.25;

pub(crate) fn line_height(font_size: f32) -> f32 {
    font_size * LEADING
}

/// Distance from the top of a line box to its baseline.
pub(crate) fn baseline_offset(fonts: &FontSet, font_size: f32) -> f32 {
    let ascent = fonts.regular.ascender_ratio().max(fonts.bold.ascender_ratio());
    font_size * ascent + (line_height(font_size) - font_size) / 2.0
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Span {
    pub(crate) text: String,
    pub(crate) bold: bool,
}

impl Span {
    pub(crate) fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }

    pub(crate) fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
        }
    }
}

/// Inline markup limited to `**bold**` spans. An unmatched `**` stays literal.
pub(crate) fn parse_inline(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("**") else {
            break;
        };
        if start > 0 {
            spans.push(Span::plain(&rest[..start]));
        }
        if end > 0 {
            spans.push(Span::bold(&after[..end]));
        }
        rest = &after[end + 2..];
    }
    if !rest.is_empty() {
        spans.push(Span::plain(rest));
    }
    spans
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Align {
    Left,
    Center,
    Right,
}

/// Contiguous same-font text within a line.
#[derive(Debug)]
pub(crate) struct Chunk {
    pub(crate) text: String,
    pub(crate) bold: bool,
    pub(crate) x_offset: f32,
    pub(crate) width: f32,
}

#[derive(Debug, Default)]
pub(crate) struct TextLine {
    pub(crate) chunks: Vec<Chunk>,
    pub(crate) width: f32,
}

#[cfg(test)]
impl TextLine {
    pub(crate) fn text(&self) -> String {
        let mut out = String::new();
        for chunk in &self.chunks {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&chunk.text);
        }
        out
    }
}

#[derive(Default)]
struct LineBuilder {
    chunks: Vec<Chunk>,
    x: f32,
}

impl LineBuilder {
    fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    fn push(&mut self, word: &str, bold: bool, x: f32, width: f32, spaced: bool) {
        match self.chunks.last_mut() {
            Some(last) if last.bold == bold => {
                if spaced {
                    last.text.push(' ');
                }
                last.text.push_str(word);
                last.width = x + width - last.x_offset;
            }
            _ => self.chunks.push(Chunk {
                text: word.to_string(),
                bold,
                x_offset: x,
                width,
            }),
        }
        self.x = x + width;
    }

    fn finish(&mut self) -> TextLine {
        self.x = 0.0;
        let chunks = std::mem::take(&mut self.chunks);
        let width = chunks.last().map(|c| c.x_offset + c.width).unwrap_or(0.0);
        TextLine { chunks, width }
    }
}

/// Break `spans` into lines no wider than `max_width`. Explicit newlines end a
/// line; a blank line between paragraphs is kept. Words wider than the line
/// are split between characters. Always returns at least one line.
pub(crate) fn wrap(
    spans: &[Span],
    fonts: &FontSet,
    font_size: f32,
    max_width: f32,
) -> Result<Vec<TextLine>, Error> {
    let mut lines = Vec::new();
    let mut builder = LineBuilder::default();
    let mut pending_space = false;

    for span in spans {
        let font = fonts.get(span.bold);
        let space_w = font.text_width(" ", font_size);

        for (seg_idx, segment) in span.text.split('\n').enumerate() {
            if seg_idx > 0 {
                lines.push(builder.finish());
                pending_space = false;
            }
            if segment.starts_with(char::is_whitespace) {
                pending_space = true;
            }

            let mut placed_any = false;
            for (i, word) in segment.split_whitespace().enumerate() {
                placed_any = true;
                let spaced = !builder.is_empty() && (i > 0 || pending_space);
                let ww = font.text_width(word, font_size);

                if ww > max_width {
                    let pieces = split_word(word, |s| font.text_width(s, font_size), max_width)?;
                    for (pi, piece) in pieces.into_iter().enumerate() {
                        if !builder.is_empty() {
                            lines.push(builder.finish());
                        }
                        let pw = font.text_width(piece, font_size);
                        builder.push(piece, span.bold, 0.0, pw, spaced && pi == 0);
                    }
                    continue;
                }

                let proposed_x = if spaced { builder.x + space_w } else { builder.x };
                if !builder.is_empty() && proposed_x + ww > max_width {
                    lines.push(builder.finish());
                    builder.push(word, span.bold, 0.0, ww, false);
                } else {
                    builder.push(word, span.bold, proposed_x, ww, spaced);
                }
            }
            if placed_any {
                pending_space = segment.ends_with(char::is_whitespace);
            }
        }
    }

    if !builder.is_empty() || lines.is_empty() {
        lines.push(builder.finish());
    }
    Ok(lines)
}

/// Greedy character split of an unbreakable token.
fn split_word(
    word: &str,
    measure: impl Fn(&str) -> f32,
    max_width: f32,
) -> Result<Vec<&str>, Error> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut last_fit = None;
    for (idx, ch) in word.char_indices() {
        let end = idx + ch.len_utf8();
        if measure(&word[start..end]) <= max_width {
            last_fit = Some(end);
            continue;
        }
        let Some(fit) = last_fit else {
            return Err(Error::Render(format!(
                "character {ch:?} is wider than the {max_width:.1}pt column"
            )));
        };
        pieces.push(&word[start..fit]);
        start = fit;
        if measure(&word[start..end]) > max_width {
            return Err(Error::Render(format!(
                "character {ch:?} is wider than the {max_width:.1}pt column"
            )));
        }
        last_fit = Some(end);
    }
    if start < word.len() {
        pieces.push(&word[start..]);
    }
    Ok(pieces)
}

/// Wrap and draw `spans` starting at the line box whose top is `top`,
/// ignoring the content cursor. Used for overlay text. Returns the height used.
pub(crate) fn draw_text(
    content: &mut Content,
    fonts: &mut FontSet,
    spans: &[Span],
    x: f32,
    width: f32,
    top: f32,
    font_size: f32,
    color: [u8; 3],
    align: Align,
) -> Result<f32, Error> {
    let lines = wrap(spans, fonts, font_size, width)?;
    let lh = line_height(font_size);
    let offset = baseline_offset(fonts, font_size);
    for (i, line) in lines.iter().enumerate() {
        let baseline = top - i as f32 * lh - offset;
        draw_line(content, fonts, line, x, width, baseline, font_size, color, align)?;
    }
    Ok(lines.len() as f32 * lh)
}

/// Draw one wrapped line on `baseline_y`.
pub(crate) fn draw_line(
    content: &mut Content,
    fonts: &mut FontSet,
    line: &TextLine,
    x: f32,
    width: f32,
    baseline_y: f32,
    font_size: f32,
    color: [u8; 3],
    align: Align,
) -> Result<(), Error> {
    if line.chunks.is_empty() {
        return Ok(());
    }

    // Encode first so a failure leaves no half-open text object behind.
    let mut encoded = Vec::with_capacity(line.chunks.len());
    for chunk in &line.chunks {
        let font = fonts.get_mut(chunk.bold);
        encoded.push((font.pdf_name, font.encode(&chunk.text)?));
    }

    let line_start_x = match align {
        Align::Left => x,
        Align::Center => x + (width - line.width) / 2.0,
        Align::Right => x + width - line.width,
    };

    content.begin_text();
    fill_rgb(content, color);
    let mut td_x = 0.0_f32;
    let mut td_y = 0.0_f32;
    let mut cur_font = "";
    for (chunk, (pdf_name, bytes)) in line.chunks.iter().zip(&encoded) {
        if cur_font != *pdf_name {
            content.set_font(Name(pdf_name.as_bytes()), font_size);
            cur_font = *pdf_name;
        }
        let cx = line_start_x + chunk.x_offset;
        content.next_line(cx - td_x, baseline_y - td_y);
        td_x = cx;
        td_y = baseline_y;
        content.show(Str(bytes));
    }
    content.end_text();
    Ok(())
}
