use crate::error::Error;
use crate::fonts::FontSet;

use super::Document;
use super::text::{self, Align, Span, TextLine};
use super::{fill_rect, stroke_rect};

pub(crate) struct Cell {
    pub(crate) spans: Vec<Span>,
    pub(crate) align: Align,
    pub(crate) fill: Option<[u8; 3]>,
    pub(crate) color: [u8; 3],
}

impl Cell {
    pub(crate) fn new(spans: Vec<Span>, color: [u8; 3]) -> Self {
        Self {
            spans,
            align: Align::Left,
            fill: None,
            color,
        }
    }

    pub(crate) fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub(crate) fn fill(mut self, fill: Option<[u8; 3]>) -> Self {
        self.fill = fill;
        self
    }
}

pub(crate) struct Row {
    pub(crate) cells: Vec<Cell>,
}

/// Fixed-width columns. The first `header_rows` rows are repeated at the top
/// of every page the table continues onto.
pub(crate) struct Table {
    pub(crate) widths: Vec<f32>,
    pub(crate) rows: Vec<Row>,
    pub(crate) header_rows: usize,
    pub(crate) font_size: f32,
    pub(crate) padding: f32,
    pub(crate) border: [u8; 3],
}

struct RowLayout {
    height: f32,
    cell_lines: Vec<Vec<TextLine>>,
}

/// Wrapped cell text and row heights, measured once before drawing.
pub(crate) struct TableLayout {
    rows: Vec<RowLayout>,
    header_count: usize,
}

impl TableLayout {
    fn header_height(&self) -> f32 {
        self.rows[..self.header_count].iter().map(|r| r.height).sum()
    }

    /// Header rows plus the first body row, which are kept together.
    pub(crate) fn opening_height(&self) -> f32 {
        self.header_height() + self.rows.get(self.header_count).map_or(0.0, |r| r.height)
    }
}

/// Wrap every cell. A row taller than a fresh page can never be placed and
/// is a render failure.
pub(crate) fn measure(table: &Table, fonts: &FontSet, page_height: f32) -> Result<TableLayout, Error> {
    let lh = text::line_height(table.font_size);
    let mut rows = Vec::with_capacity(table.rows.len());
    for (ri, row) in table.rows.iter().enumerate() {
        let mut max_lines = 1usize;
        let mut cell_lines = Vec::with_capacity(row.cells.len());
        for (cell, &col_w) in row.cells.iter().zip(&table.widths) {
            let text_w = (col_w - 2.0 * table.padding).max(1.0);
            let lines = text::wrap(&cell.spans, fonts, table.font_size, text_w)?;
            max_lines = max_lines.max(lines.len());
            cell_lines.push(lines);
        }
        let height = max_lines as f32 * lh + 2.0 * table.padding;
        if height > page_height {
            return Err(Error::Render(format!(
                "table row {} is {height:.1}pt tall but a page holds {page_height:.1}pt",
                ri + 1
            )));
        }
        rows.push(RowLayout { height, cell_lines });
    }
    Ok(TableLayout {
        header_count: table.header_rows.min(rows.len()),
        rows,
    })
}

/// Draw a measured table at the write position. Rows are never split; a row
/// that does not fit moves to a new page, below a repeat of the header rows.
pub(crate) fn draw(doc: &mut Document, table: &Table, layout: &TableLayout, x: f32) -> Result<(), Error> {
    let header_h = layout.header_height();
    let page_h = doc.geometry.content_height();

    for (ri, (row, row_layout)) in table.rows.iter().zip(&layout.rows).enumerate() {
        let is_header = ri < layout.header_count;
        if doc.cursor() < row_layout.height && !doc.at_page_top() {
            log::debug!(
                "Table row {} ({:.1}pt) moves to a new page, cursor {:.1}pt",
                ri + 1,
                row_layout.height,
                doc.cursor()
            );
            doc.start_new_page()?;
            if !is_header && layout.header_count > 0 && header_h + row_layout.height <= page_h {
                for (hrow, hlayout) in table.rows.iter().zip(&layout.rows).take(layout.header_count) {
                    draw_row(doc, table, hrow, hlayout, x)?;
                }
            }
        }
        draw_row(doc, table, row, row_layout, x)?;
    }
    Ok(())
}

fn draw_row(
    doc: &mut Document,
    table: &Table,
    row: &Row,
    layout: &RowLayout,
    table_left: f32,
) -> Result<(), Error> {
    let row_top = doc.y();
    let row_bottom = row_top - layout.height;
    let lh = text::line_height(table.font_size);
    let offset = text::baseline_offset(&doc.fonts, table.font_size);

    let mut cell_x = table_left;
    for ((cell, lines), &col_w) in row.cells.iter().zip(&layout.cell_lines).zip(&table.widths) {
        if let Some(fill) = cell.fill {
            fill_rect(doc.content(), cell_x, row_bottom, col_w, layout.height, fill);
        }

        let text_x = cell_x + table.padding;
        let text_w = (col_w - 2.0 * table.padding).max(1.0);
        for (i, line) in lines.iter().enumerate() {
            let baseline = row_top - table.padding - i as f32 * lh - offset;
            doc.draw_line(line, text_x, text_w, baseline, table.font_size, cell.color, cell.align)?;
        }

        stroke_rect(doc.content(), cell_x, row_bottom, col_w, layout.height, table.border, 0.5);
        cell_x += col_w;
    }

    doc.advance(layout.height);
    Ok(())
}
