use crate::error::Error;
use crate::pdf::palette::{BANNER, CARD_TITLE, DARK, INK, MARKED, MUTED, RULE, WHITE, ZEBRA};
use crate::pdf::table::{self, Cell, Row, Table};
use crate::pdf::text::{self, Align, Span, TextLine};
use crate::pdf::{Document, fill_rect, stroke_rect};

use super::{Block, BlockKind, ColumnCaption, Emphasis, FreeText, RatingRow};

const BANNER_SIZE: f32 = 14.0;
const HEADER_SIZE: f32 = 12.0;
const CARD_TITLE_SIZE: f32 = 10.0;
const BODY_SIZE: f32 = 10.0;
const SUBHEADING_SIZE: f32 = 11.0;
const TOTAL_SIZE: f32 = 11.0;
const TABLE_SIZE: f32 = 9.0;
const RATING_SIZE: f32 = 8.0;

const BANNER_PADDING: f32 = 8.0;
const BAR_PADDING: f32 = 6.0;
const CARD_INSET: f32 = 8.0;
const TABLE_PADDING: f32 = 6.0;
const RATING_PADDING: f32 = 3.0;
const PANEL_PADDING: f32 = 10.0;
const BOX_SIZE: f32 = 9.0;
const BOX_GAP: f32 = 7.0;
const BULLET_INDENT: f32 = 14.0;

const BLOCK_GAP: f32 = 10.0;
const SMALL_GAP: f32 = 4.0;
/// Headers are never left alone at the bottom of a page.
const KEEP_WITH_NEXT: f32 = 40.0;
/// Body lines that must follow a card title when the card spans pages.
const ORPHAN_LINES: f32 = 3.0;
const PANEL_MIN_HEIGHT: f32 = 120.0;
/// Question column weight of a rating grid; each response column weighs 1.
const QUESTION_WEIGHT: f32 = 5.0;

/// What the composer knows about a block's neighbours.
#[derive(Clone, Copy, Debug, Default)]
pub(super) struct Flow {
    /// Space the blocks after a header need to start on the same page.
    pub(super) keep_with_next: f32,
    /// The previous block is a header drawn on this page.
    pub(super) follows_header: bool,
}

pub(super) fn emit(doc: &mut Document, block: &Block, flow: Flow) -> Result<(), Error> {
    match block {
        Block::BannerHeader { title } => banner_header(doc, title, flow.keep_with_next),
        Block::SectionCard {
            title,
            body,
            inline_format,
        } => section_card(doc, title, body, *inline_format, flow.follows_header),
        Block::SectionCardHeader { title, emphasis } => {
            section_card_header(doc, title, *emphasis, flow.keep_with_next)
        }
        Block::ThreeColumnTable { headers, rows } => three_column_table(doc, headers, rows),
        Block::AlternatingTable { headers, rows } => alternating_table(doc, headers, rows),
        Block::LabeledField { label, value } => labeled_field(doc, label, value),
        Block::CheckboxItem { text, checked } => checkbox_item(doc, text, *checked),
        Block::EmptyState { message } => empty_state(doc, message),
        Block::Paragraph { text } => paragraph(doc, text),
        Block::Subheading { text } => subheading(doc, text),
        Block::BulletList { items } => bullet_list(doc, items),
        Block::ScoreTotal { label, value } => score_total(doc, label, value),
        Block::NarrativePanel { text } => narrative_panel(doc, text),
        Block::Spacer(points) => {
            doc.record(BlockKind::Spacer, "");
            doc.advance(*points);
            Ok(())
        }
    }
}

struct Bar {
    lines: Vec<TextLine>,
    height: f32,
    size: f32,
    padding: f32,
}

fn measure_bar(doc: &Document, title: &str, size: f32, padding: f32) -> Result<Bar, Error> {
    let lines = text::wrap(&[Span::bold(title)], &doc.fonts, size, doc.width() - 2.0 * padding)?;
    let height = lines.len() as f32 * text::line_height(size) + 2.0 * padding;
    Ok(Bar {
        lines,
        height,
        size,
        padding,
    })
}

/// Filled full-width bar with its title inset; advances past the bar.
fn draw_bar(doc: &mut Document, bar: &Bar, fill: [u8; 3], color: [u8; 3]) -> Result<(), Error> {
    let top = doc.y();
    let (x, width) = (doc.left(), doc.width());
    fill_rect(doc.content(), x, top - bar.height, width, bar.height, fill);

    let lh = text::line_height(bar.size);
    let offset = text::baseline_offset(&doc.fonts, bar.size);
    for (i, line) in bar.lines.iter().enumerate() {
        let baseline = top - bar.padding - i as f32 * lh - offset;
        doc.draw_line(
            line,
            x + bar.padding,
            width - 2.0 * bar.padding,
            baseline,
            bar.size,
            color,
            Align::Left,
        )?;
    }
    doc.advance(bar.height);
    Ok(())
}

/// Space a block needs to start on the current page when it directly follows
/// a header. Headers report their own height; the composer chains them.
pub(super) fn lead(doc: &Document, block: &Block) -> Result<f32, Error> {
    let lh = text::line_height(BODY_SIZE);
    Ok(match block {
        Block::BannerHeader { title } => {
            measure_bar(doc, title, BANNER_SIZE, BANNER_PADDING)?.height + BLOCK_GAP
        }
        Block::SectionCardHeader { title, .. } => {
            measure_bar(doc, title, HEADER_SIZE, BAR_PADDING)?.height + SMALL_GAP
        }
        Block::SectionCard {
            title,
            body,
            inline_format,
        } => measure_card(doc, title, body, *inline_format)?.split_height(),
        Block::ThreeColumnTable { headers, rows } => {
            let table = three_column(doc, headers, rows);
            table::measure(&table, &doc.fonts, doc.geometry.content_height())?.opening_height()
        }
        Block::AlternatingTable { headers, rows } => {
            let table = rating_grid(doc, headers, rows);
            table::measure(&table, &doc.fonts, doc.geometry.content_height())?.opening_height()
        }
        Block::EmptyState { message } => measure_empty_state(doc, message)?.1,
        Block::NarrativePanel { .. } => PANEL_MIN_HEIGHT,
        Block::Spacer(points) => *points,
        _ => lh,
    })
}

fn banner_header(doc: &mut Document, title: &str, keep_with_next: f32) -> Result<(), Error> {
    let bar = measure_bar(doc, title, BANNER_SIZE, BANNER_PADDING)?;
    doc.ensure_space(bar.height + BLOCK_GAP + keep_with_next.max(KEEP_WITH_NEXT))?;
    doc.record(BlockKind::BannerHeader, title);
    draw_bar(doc, &bar, BANNER, WHITE)?;
    doc.advance(BLOCK_GAP);
    Ok(())
}

fn section_card_header(
    doc: &mut Document,
    title: &str,
    emphasis: Emphasis,
    keep_with_next: f32,
) -> Result<(), Error> {
    let bar = measure_bar(doc, title, HEADER_SIZE, BAR_PADDING)?;
    doc.ensure_space(bar.height + SMALL_GAP + keep_with_next.max(KEEP_WITH_NEXT))?;
    doc.record(BlockKind::SectionCardHeader, title);
    let (fill, color) = match emphasis {
        Emphasis::Standard => (CARD_TITLE, INK),
        Emphasis::Dark => (DARK, WHITE),
    };
    draw_bar(doc, &bar, fill, color)?;
    doc.advance(SMALL_GAP);
    Ok(())
}

struct Card {
    bar: Bar,
    lines: Vec<TextLine>,
}

impl Card {
    fn whole_height(&self) -> f32 {
        self.bar.height + self.lines.len() as f32 * text::line_height(BODY_SIZE) + 2.0 * CARD_INSET
    }

    /// Title plus the first few body lines, or the whole card when shorter.
    fn split_height(&self) -> f32 {
        let orphans = self.bar.height + CARD_INSET + ORPHAN_LINES * text::line_height(BODY_SIZE);
        orphans.min(self.whole_height())
    }
}

fn measure_card(doc: &Document, title: &str, body: &FreeText, inline_format: bool) -> Result<Card, Error> {
    let bar = measure_bar(doc, title, CARD_TITLE_SIZE, BAR_PADDING)?;
    let resolved = body.resolve();
    let spans = if inline_format {
        text::parse_inline(resolved)
    } else {
        vec![Span::plain(resolved)]
    };
    let lines = text::wrap(&spans, &doc.fonts, BODY_SIZE, doc.width() - 2.0 * CARD_INSET)?;
    Ok(Card { bar, lines })
}

/// A card moves to the next page whole when it fits on one. Directly under a
/// header it only needs its first lines, so it never leaves the header behind.
fn section_card(
    doc: &mut Document,
    title: &str,
    body: &FreeText,
    inline_format: bool,
    follows_header: bool,
) -> Result<(), Error> {
    let card = measure_card(doc, title, body, inline_format)?;
    let whole = card.whole_height();
    let needed = if !follows_header && whole <= doc.geometry.content_height() {
        whole
    } else {
        card.split_height()
    };
    doc.ensure_space(needed)?;

    doc.record(BlockKind::SectionCard, title);
    draw_bar(doc, &card.bar, CARD_TITLE, INK)?;
    doc.advance(CARD_INSET);
    let x = doc.left() + CARD_INSET;
    let body_width = doc.width() - 2.0 * CARD_INSET;
    doc.flow_lines(&card.lines, x, body_width, BODY_SIZE, INK, Align::Left)?;
    doc.advance(CARD_INSET + BLOCK_GAP);
    Ok(())
}

fn caption_cell(caption: &ColumnCaption) -> Cell {
    let spans = vec![
        Span::bold(caption.caption.as_str()),
        Span::plain(format!("\n{}", caption.gloss)),
    ];
    Cell::new(spans, INK).fill(Some(CARD_TITLE))
}

fn three_column_table(doc: &mut Document, headers: &[ColumnCaption; 3], rows: &[[FreeText; 3]]) -> Result<(), Error> {
    let table = three_column(doc, headers, rows);
    place_table(doc, &table, BlockKind::ThreeColumnTable, &headers[0].caption)
}

fn three_column(doc: &Document, headers: &[ColumnCaption; 3], rows: &[[FreeText; 3]]) -> Table {
    let column = doc.width() / 3.0;
    let mut table_rows = vec![Row {
        cells: headers.iter().map(caption_cell).collect(),
    }];
    table_rows.extend(rows.iter().map(|row| Row {
        cells: row
            .iter()
            .map(|value| Cell::new(vec![Span::plain(value.resolve())], INK))
            .collect(),
    }));
    Table {
        widths: vec![column; 3],
        rows: table_rows,
        header_rows: 1,
        font_size: TABLE_SIZE,
        padding: TABLE_PADDING,
        border: RULE,
    }
}

fn alternating_table(doc: &mut Document, headers: &[String], rows: &[RatingRow]) -> Result<(), Error> {
    let table = rating_grid(doc, headers, rows);
    let label = headers.first().map_or("", String::as_str);
    place_table(doc, &table, BlockKind::AlternatingTable, label)
}

fn rating_grid(doc: &Document, headers: &[String], rows: &[RatingRow]) -> Table {
    let responses = headers.len().saturating_sub(1);
    let unit = doc.width() / (QUESTION_WEIGHT + responses as f32);
    let mut widths = vec![unit * QUESTION_WEIGHT];
    widths.extend(std::iter::repeat_n(unit, responses));

    let header = Row {
        cells: headers
            .iter()
            .enumerate()
            .map(|(i, caption)| {
                let align = if i == 0 { Align::Left } else { Align::Center };
                Cell::new(vec![Span::bold(caption.as_str())], WHITE)
                    .align(align)
                    .fill(Some(BANNER))
            })
            .collect(),
    };

    let mut table_rows = vec![header];
    for (ri, row) in rows.iter().enumerate() {
        let stripe = (ri % 2 == 1).then_some(ZEBRA);
        let mut cells = vec![Cell::new(vec![Span::plain(row.label.as_str())], INK).fill(stripe)];
        for choice in 0..responses {
            let cell = if row.marked == Some(choice) {
                Cell::new(vec![Span::bold("X")], INK).fill(Some(MARKED))
            } else {
                Cell::new(Vec::new(), INK).fill(stripe)
            };
            cells.push(cell.align(Align::Center));
        }
        table_rows.push(Row { cells });
    }

    Table {
        widths,
        rows: table_rows,
        header_rows: 1,
        font_size: RATING_SIZE,
        padding: RATING_PADDING,
        border: RULE,
    }
}

fn place_table(doc: &mut Document, table: &Table, kind: BlockKind, label: &str) -> Result<(), Error> {
    let layout = table::measure(table, &doc.fonts, doc.geometry.content_height())?;
    doc.ensure_space(layout.opening_height())?;
    doc.record(kind, label);
    let x = doc.left();
    table::draw(doc, table, &layout, x)?;
    doc.advance(BLOCK_GAP);
    Ok(())
}

fn labeled_field(doc: &mut Document, label: &str, value: &FreeText) -> Result<(), Error> {
    let spans = [Span::bold(format!("{label}: ")), Span::plain(value.resolve())];
    let lines = text::wrap(&spans, &doc.fonts, BODY_SIZE, doc.width())?;
    doc.ensure_space(text::line_height(BODY_SIZE))?;
    doc.record(BlockKind::LabeledField, label);
    let (x, width) = (doc.left(), doc.width());
    doc.flow_lines(&lines, x, width, BODY_SIZE, INK, Align::Left)?;
    doc.advance(SMALL_GAP * 2.0);
    Ok(())
}

fn checkbox_item(doc: &mut Document, label: &str, checked: bool) -> Result<(), Error> {
    let indent = BOX_SIZE + BOX_GAP;
    let width = doc.width() - indent;
    let lines = text::wrap(&[Span::plain(label)], &doc.fonts, BODY_SIZE, width)?;
    let lh = text::line_height(BODY_SIZE);
    doc.ensure_space(lines.len() as f32 * lh)?;
    doc.record(BlockKind::CheckboxItem, label);

    let x = doc.left();
    let box_y = doc.y() - (lh + BOX_SIZE) / 2.0;
    if checked {
        fill_rect(doc.content(), x + 2.0, box_y + 2.0, BOX_SIZE - 4.0, BOX_SIZE - 4.0, DARK);
    }
    stroke_rect(doc.content(), x, box_y, BOX_SIZE, BOX_SIZE, INK, 0.75);
    doc.flow_lines(&lines, x + indent, width, BODY_SIZE, INK, Align::Left)?;
    doc.advance(SMALL_GAP);
    Ok(())
}

fn measure_empty_state(doc: &Document, message: &str) -> Result<(Vec<TextLine>, f32), Error> {
    let inner = doc.width() - 2.0 * CARD_INSET;
    let lines = text::wrap(&[Span::plain(message)], &doc.fonts, BODY_SIZE, inner)?;
    let height = lines.len() as f32 * text::line_height(BODY_SIZE) + 2.0 * CARD_INSET;
    Ok((lines, height))
}

fn empty_state(doc: &mut Document, message: &str) -> Result<(), Error> {
    let inner = doc.width() - 2.0 * CARD_INSET;
    let (lines, height) = measure_empty_state(doc, message)?;
    doc.ensure_space(height)?;
    doc.record(BlockKind::EmptyState, message);

    let (x, width, top) = (doc.left(), doc.width(), doc.y());
    fill_rect(doc.content(), x, top - height, width, height, ZEBRA);
    stroke_rect(doc.content(), x, top - height, width, height, RULE, 0.75);
    doc.advance(CARD_INSET);
    doc.flow_lines(&lines, x + CARD_INSET, inner, BODY_SIZE, MUTED, Align::Center)?;
    doc.advance(CARD_INSET + BLOCK_GAP);
    Ok(())
}

fn paragraph(doc: &mut Document, body: &str) -> Result<(), Error> {
    let lines = text::wrap(&[Span::plain(body)], &doc.fonts, BODY_SIZE, doc.width())?;
    doc.ensure_space(text::line_height(BODY_SIZE))?;
    doc.record(BlockKind::Paragraph, short_label(body));
    let (x, width) = (doc.left(), doc.width());
    doc.flow_lines(&lines, x, width, BODY_SIZE, INK, Align::Left)?;
    doc.advance(SMALL_GAP * 2.0);
    Ok(())
}

fn subheading(doc: &mut Document, caption: &str) -> Result<(), Error> {
    let lines = text::wrap(&[Span::bold(caption)], &doc.fonts, SUBHEADING_SIZE, doc.width())?;
    let height = lines.len() as f32 * text::line_height(SUBHEADING_SIZE);
    doc.ensure_space(height + KEEP_WITH_NEXT)?;
    doc.record(BlockKind::Subheading, caption);
    let (x, width) = (doc.left(), doc.width());
    doc.flow_lines(&lines, x, width, SUBHEADING_SIZE, INK, Align::Left)?;
    doc.advance(SMALL_GAP);
    Ok(())
}

fn bullet_list(doc: &mut Document, items: &[String]) -> Result<(), Error> {
    let lh = text::line_height(BODY_SIZE);
    let width = doc.width() - BULLET_INDENT;
    let bullet = text::wrap(&[Span::plain("\u{2022}")], &doc.fonts, BODY_SIZE, BULLET_INDENT)?;
    doc.ensure_space(lh)?;
    doc.record(BlockKind::BulletList, items.first().map_or("", |s| short_label(s)));

    for item in items {
        let lines = text::wrap(&[Span::plain(item.as_str())], &doc.fonts, BODY_SIZE, width)?;
        doc.ensure_space(lh)?;
        let x = doc.left();
        let baseline = doc.y() - text::baseline_offset(&doc.fonts, BODY_SIZE);
        if let Some(mark) = bullet.first() {
            doc.draw_line(mark, x, BULLET_INDENT, baseline, BODY_SIZE, INK, Align::Left)?;
        }
        doc.flow_lines(&lines, x + BULLET_INDENT, width, BODY_SIZE, INK, Align::Left)?;
        doc.advance(SMALL_GAP / 2.0);
    }
    doc.advance(SMALL_GAP);
    Ok(())
}

fn score_total(doc: &mut Document, label: &str, value: &str) -> Result<(), Error> {
    let spans = [Span::bold(format!("{label} {value}"))];
    let lines = text::wrap(&spans, &doc.fonts, TOTAL_SIZE, doc.width())?;
    doc.ensure_space(lines.len() as f32 * text::line_height(TOTAL_SIZE))?;
    doc.record(BlockKind::ScoreTotal, label);
    let (x, width) = (doc.left(), doc.width());
    doc.flow_lines(&lines, x, width, TOTAL_SIZE, INK, Align::Right)?;
    doc.advance(BLOCK_GAP);
    Ok(())
}

/// A bordered box reaching the bottom margin. Text that overflows continues
/// in a fresh box on the next page. Leaves the cursor at zero.
fn narrative_panel(doc: &mut Document, body: &FreeText) -> Result<(), Error> {
    let inner = doc.width() - 2.0 * PANEL_PADDING;
    let lines = text::wrap(&[Span::plain(body.resolve())], &doc.fonts, BODY_SIZE, inner)?;
    let lh = text::line_height(BODY_SIZE);
    let offset = text::baseline_offset(&doc.fonts, BODY_SIZE);

    doc.ensure_space(PANEL_MIN_HEIGHT)?;
    doc.record(BlockKind::NarrativePanel, short_label(body.resolve()));

    let mut remaining = &lines[..];
    loop {
        let (x, width, top) = (doc.left(), doc.width(), doc.y());
        let bottom = doc.geometry.margin_bottom;
        let capacity = ((doc.cursor() - 2.0 * PANEL_PADDING) / lh).floor().max(1.0) as usize;
        let (now, rest) = remaining.split_at(capacity.min(remaining.len()));
        for (i, line) in now.iter().enumerate() {
            let baseline = top - PANEL_PADDING - i as f32 * lh - offset;
            doc.draw_line(line, x + PANEL_PADDING, inner, baseline, BODY_SIZE, INK, Align::Left)?;
        }
        stroke_rect(doc.content(), x, bottom, width, top - bottom, RULE, 0.75);
        let left = doc.cursor();
        doc.advance(left);

        remaining = rest;
        if remaining.is_empty() {
            return Ok(());
        }
        log::debug!("Narrative panel continues with {} lines", remaining.len());
        doc.start_new_page()?;
    }
}

fn short_label(text: &str) -> &str {
    match text.char_indices().nth(40) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
