pub(crate) mod frame;
pub(crate) mod table;
pub(crate) mod text;

use std::time::Instant;

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, TextStr};

use crate::compose::{BlockKind, PlacedBlock};
use crate::error::Error;
use crate::fonts::FontSet;
use crate::options::{PageGeometry, PageNumberStyle};

use text::{Align, TextLine};

pub(crate) mod palette {
    pub(crate) const INK: [u8; 3] = [30, 41, 59];
    pub(crate) const MUTED: [u8; 3] = [100, 116, 139];
    pub(crate) const WHITE: [u8; 3] = [255, 255, 255];
    pub(crate) const BANNER: [u8; 3] = [37, 78, 112];
    pub(crate) const CARD_TITLE: [u8; 3] = [226, 234, 243];
    pub(crate) const DARK: [u8; 3] = [51, 65, 85];
    pub(crate) const ZEBRA: [u8; 3] = [243, 246, 250];
    pub(crate) const MARKED: [u8; 3] = [207, 226, 243];
    pub(crate) const RULE: [u8; 3] = [203, 213, 225];
}

pub(crate) fn fill_rgb(content: &mut Content, [r, g, b]: [u8; 3]) {
    content.set_fill_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
}

pub(crate) fn stroke_rgb(content: &mut Content, [r, g, b]: [u8; 3]) {
    content.set_stroke_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
}

pub(crate) fn fill_rect(content: &mut Content, x: f32, y: f32, w: f32, h: f32, color: [u8; 3]) {
    content.save_state();
    fill_rgb(content, color);
    content.rect(x, y, w, h);
    content.fill_nonzero();
    content.restore_state();
}

pub(crate) fn stroke_rect(
    content: &mut Content,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    color: [u8; 3],
    line_width: f32,
) {
    content.save_state();
    stroke_rgb(content, color);
    content.set_line_width(line_width);
    content.rect(x, y, w, h);
    content.stroke();
    content.restore_state();
}

pub(crate) fn hline(content: &mut Content, x1: f32, x2: f32, y: f32, color: [u8; 3], line_width: f32) {
    content.save_state();
    stroke_rgb(content, color);
    content.set_line_width(line_width);
    content.move_to(x1, y);
    content.line_to(x2, y);
    content.stroke();
    content.restore_state();
}

/// Drawn at the start of every page, outside the content cursor.
pub(crate) type Overlay =
    Box<dyn Fn(&mut Content, &mut FontSet, &PageGeometry) -> Result<(), Error>>;

pub(crate) struct Page {
    content: Content,
    placed: Vec<PlacedBlock>,
}

/// A decoded raster image ready to be written as an XObject.
pub(crate) struct ImageXObject {
    pub(crate) name: &'static str,
    pub(crate) width: u32,
    pub(crate) height: u32,
    rgb: Vec<u8>,
    alpha: Option<Vec<u8>>,
}

impl ImageXObject {
    pub(crate) fn decode(name: &'static str, bytes: &[u8]) -> Result<Self, image::ImageError> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);

        let rgb_data: Vec<u8> = rgba
            .pixels()
            .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
            .collect();
        let alpha = has_alpha.then(|| {
            let alpha_data: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
            miniz_oxide::deflate::compress_to_vec_zlib(&alpha_data, 6)
        });

        Ok(Self {
            name,
            width,
            height,
            rgb: miniz_oxide::deflate::compress_to_vec_zlib(&rgb_data, 6),
            alpha,
        })
    }

    fn write(&self, pdf: &mut Pdf, xobj_ref: Ref, alloc: &mut impl FnMut() -> Ref) {
        let smask_ref = self.alpha.as_ref().map(|alpha| {
            let mask_ref = alloc();
            let mut mask = pdf.image_xobject(mask_ref, alpha);
            mask.filter(Filter::FlateDecode);
            mask.width(self.width as i32);
            mask.height(self.height as i32);
            mask.color_space().device_gray();
            mask.bits_per_component(8);
            mask_ref
        });

        let mut xobj = pdf.image_xobject(xobj_ref, &self.rgb);
        xobj.filter(Filter::FlateDecode);
        xobj.width(self.width as i32);
        xobj.height(self.height as i32);
        xobj.color_space().device_rgb();
        xobj.bits_per_component(8);
        if let Some(mask_ref) = smask_ref {
            xobj.s_mask(mask_ref);
        }
    }
}

/// Stage 1 state: the page being written, the pages already closed, and the
/// cursor (vertical space left between the write position and the bottom
/// margin). Owned by exactly one export call.
pub(crate) struct Document {
    pub(crate) geometry: PageGeometry,
    pub(crate) fonts: FontSet,
    images: Vec<ImageXObject>,
    overlay: Overlay,
    closed: Vec<Page>,
    current: Page,
    cursor: f32,
}

impl Document {
    pub(crate) fn new(
        geometry: PageGeometry,
        mut fonts: FontSet,
        images: Vec<ImageXObject>,
        overlay: Overlay,
    ) -> Result<Self, Error> {
        if geometry.content_height() <= 0.0 || geometry.content_width() <= 0.0 {
            return Err(Error::Render(format!(
                "page geometry leaves no content area ({:.1} x {:.1}pt)",
                geometry.content_width(),
                geometry.content_height()
            )));
        }
        let mut content = Content::new();
        overlay(&mut content, &mut fonts, &geometry)?;
        Ok(Self {
            geometry,
            fonts,
            images,
            overlay,
            closed: Vec::new(),
            current: Page {
                content,
                placed: Vec::new(),
            },
            cursor: geometry.content_height(),
        })
    }

    pub(crate) fn cursor(&self) -> f32 {
        self.cursor
    }

    /// Absolute y of the write position.
    pub(crate) fn y(&self) -> f32 {
        self.geometry.margin_bottom + self.cursor
    }

    pub(crate) fn left(&self) -> f32 {
        self.geometry.margin_left
    }

    pub(crate) fn width(&self) -> f32 {
        self.geometry.content_width()
    }

    pub(crate) fn page_number(&self) -> usize {
        self.closed.len() + 1
    }

    pub(crate) fn at_page_top(&self) -> bool {
        (self.cursor - self.geometry.content_height()).abs() < 0.5
    }

    pub(crate) fn content(&mut self) -> &mut Content {
        &mut self.current.content
    }

    /// Close the current page and open a fresh one with its overlay drawn.
    pub(crate) fn start_new_page(&mut self) -> Result<(), Error> {
        let mut content = Content::new();
        (self.overlay)(&mut content, &mut self.fonts, &self.geometry)?;
        let finished = std::mem::replace(
            &mut self.current,
            Page {
                content,
                placed: Vec::new(),
            },
        );
        self.closed.push(finished);
        self.cursor = self.geometry.content_height();
        log::debug!("Started page {}", self.page_number());
        Ok(())
    }

    /// Break to a new page when less than `needed` remains, unless the page
    /// is still empty. Returns whether a break happened.
    pub(crate) fn ensure_space(&mut self, needed: f32) -> Result<bool, Error> {
        if self.cursor < needed && !self.at_page_top() {
            log::debug!(
                "Page break on page {}: need {needed:.1}pt, cursor {:.1}pt",
                self.page_number(),
                self.cursor
            );
            self.start_new_page()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Move the write position down. The cursor never drops below zero.
    pub(crate) fn advance(&mut self, dy: f32) {
        self.cursor = (self.cursor - dy).max(0.0);
    }

    pub(crate) fn record(&mut self, kind: BlockKind, label: impl Into<String>) {
        let placed = PlacedBlock {
            kind,
            label: label.into(),
            cursor: self.cursor,
        };
        log::debug!(
            "Placed {:?} {:?} on page {} at cursor {:.1}",
            placed.kind,
            placed.label,
            self.page_number(),
            placed.cursor
        );
        self.current.placed.push(placed);
    }

    /// Draw wrapped lines from the write position downward, continuing on new
    /// pages as the cursor runs out.
    pub(crate) fn flow_lines(
        &mut self,
        lines: &[TextLine],
        x: f32,
        width: f32,
        font_size: f32,
        color: [u8; 3],
        align: Align,
    ) -> Result<(), Error> {
        let lh = text::line_height(font_size);
        let offset = text::baseline_offset(&self.fonts, font_size);
        for line in lines {
            if self.cursor < lh && !self.at_page_top() {
                self.start_new_page()?;
            }
            let baseline = self.y() - offset;
            self.draw_line(line, x, width, baseline, font_size, color, align)?;
            self.advance(lh);
        }
        Ok(())
    }

    /// Draw one line at an absolute baseline without touching the cursor.
    pub(crate) fn draw_line(
        &mut self,
        line: &TextLine,
        x: f32,
        width: f32,
        baseline_y: f32,
        font_size: f32,
        color: [u8; 3],
        align: Align,
    ) -> Result<(), Error> {
        text::draw_line(
            &mut self.current.content,
            &mut self.fonts,
            line,
            x,
            width,
            baseline_y,
            font_size,
            color,
            align,
        )
    }

    pub(crate) fn into_layout(self, title: String, compress: bool, page_numbers: PageNumberStyle) -> Layout {
        let mut pages = self.closed;
        pages.push(self.current);
        Layout {
            pages,
            fonts: self.fonts,
            images: self.images,
            geometry: self.geometry,
            title,
            compress,
            page_numbers,
        }
    }
}

/// What one page of a finished layout holds.
#[derive(Clone, Copy, Debug)]
pub struct PageSummary<'a> {
    /// 1-based.
    pub number: usize,
    pub blocks: &'a [PlacedBlock],
}

/// A fully paginated document whose page count is fixed. Page numbers are
/// stamped and the PDF is serialized by [`Layout::finish`].
pub struct Layout {
    pages: Vec<Page>,
    fonts: FontSet,
    images: Vec<ImageXObject>,
    geometry: PageGeometry,
    title: String,
    compress: bool,
    page_numbers: PageNumberStyle,
}

impl Layout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> Vec<PageSummary<'_>> {
        self.pages
            .iter()
            .enumerate()
            .map(|(i, page)| PageSummary {
                number: i + 1,
                blocks: &page.placed,
            })
            .collect()
    }

    pub fn finish(self) -> Result<Vec<u8>, Error> {
        let t0 = Instant::now();
        let Layout {
            pages,
            mut fonts,
            images,
            geometry,
            title,
            compress,
            page_numbers,
        } = self;

        // Stage 2: the page count is known, stamp every page exactly once.
        let total = pages.len();
        let mut contents = Vec::with_capacity(total);
        for (index, page) in pages.into_iter().enumerate() {
            let mut content = page.content;
            frame::stamp_page_number(&mut content, &mut fonts, &geometry, page_numbers, index, total)?;
            contents.push(content);
        }
        let t_stamp = t0.elapsed();

        let mut pdf = Pdf::new();
        let mut next_id = 1i32;
        let mut alloc = || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };

        let catalog_id = alloc();
        let pages_id = alloc();
        let info_id = alloc();

        let font_refs = [alloc(), alloc()];
        fonts.regular.write(&mut pdf, font_refs[0], &mut alloc)?;
        fonts.bold.write(&mut pdf, font_refs[1], &mut alloc)?;
        let font_pairs = [
            (fonts.regular.pdf_name, font_refs[0]),
            (fonts.bold.pdf_name, font_refs[1]),
        ];

        let mut image_xobjects: Vec<(&str, Ref)> = Vec::with_capacity(images.len());
        for image in &images {
            let xobj_ref = alloc();
            image.write(&mut pdf, xobj_ref, &mut alloc);
            image_xobjects.push((image.name, xobj_ref));
        }

        let page_ids: Vec<Ref> = (0..total).map(|_| alloc()).collect();
        let content_ids: Vec<Ref> = (0..total).map(|_| alloc()).collect();

        for (i, c) in contents.into_iter().enumerate() {
            let raw = c.finish();
            if compress {
                let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
                pdf.stream(content_ids[i], &compressed).filter(Filter::FlateDecode);
            } else {
                pdf.stream(content_ids[i], raw.as_slice());
            }
        }

        pdf.catalog(catalog_id).pages(pages_id);
        pdf.pages(pages_id)
            .kids(page_ids.iter().copied())
            .count(total as i32);

        for i in 0..total {
            let mut page = pdf.page(page_ids[i]);
            page.media_box(Rect::new(0.0, 0.0, geometry.page_width, geometry.page_height))
                .parent(pages_id)
                .contents(content_ids[i]);
            let mut resources = page.resources();
            {
                let mut font_dict = resources.fonts();
                for (name, font_ref) in &font_pairs {
                    font_dict.pair(Name(name.as_bytes()), *font_ref);
                }
            }
            if !image_xobjects.is_empty() {
                let mut xobjects = resources.x_objects();
                for (name, xobj_ref) in &image_xobjects {
                    xobjects.pair(Name(name.as_bytes()), *xobj_ref);
                }
            }
        }

        pdf.document_info(info_id)
            .title(TextStr(&title))
            .producer(TextStr(concat!("worksheet-pdf ", env!("CARGO_PKG_VERSION"))));

        let bytes = pdf.finish();
        log::info!(
            "Finish phases: stamp={:.1}ms, assembly={:.1}ms ({} pages, {} bytes)",
            t_stamp.as_secs_f64() * 1000.0,
            (t0.elapsed() - t_stamp).as_secs_f64() * 1000.0,
            total,
            bytes.len(),
        );
        Ok(bytes)
    }
}
