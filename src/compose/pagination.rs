//! Break checks run before a block is drawn. Thresholds are fixed worst-case
//! margins rather than measured block heights.

use crate::error::Error;
use crate::pdf::Document;

use super::Break;

/// Space a new section needs before it may start on the current page.
pub const SECTION_THRESHOLD: f32 = 200.0;
/// Tighter margin for successive items of a list.
pub const ITEM_THRESHOLD: f32 = 150.0;

pub(crate) fn ensure_space_for_section(doc: &mut Document) -> Result<bool, Error> {
    doc.ensure_space(SECTION_THRESHOLD)
}

pub(crate) fn ensure_space_for_item(doc: &mut Document) -> Result<bool, Error> {
    doc.ensure_space(ITEM_THRESHOLD)
}

/// The section check, skipped for `index == 0` so the first item of a loop
/// stays right below its header.
pub(crate) fn ensure_space_for_section_unless_first(
    doc: &mut Document,
    index: usize,
) -> Result<bool, Error> {
    if index == 0 {
        return Ok(false);
    }
    ensure_space_for_section(doc)
}

pub(crate) fn apply(doc: &mut Document, brk: Break) -> Result<bool, Error> {
    match brk {
        Break::None => Ok(false),
        Break::Section => ensure_space_for_section(doc),
        Break::Item => ensure_space_for_item(doc),
        Break::SectionUnlessFirst(index) => ensure_space_for_section_unless_first(doc, index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FontSet;
    use crate::options::PageGeometry;

    fn blank_document() -> Document {
        Document::new(
            PageGeometry::LETTER,
            FontSet::builtin(),
            Vec::new(),
            Box::new(|_: &mut pdf_writer::Content, _: &mut FontSet, _: &PageGeometry| -> Result<(), Error> {
                Ok(())
            }),
        )
        .unwrap()
    }

    /// Move the cursor to `remaining` points above the bottom margin.
    fn leave(doc: &mut Document, remaining: f32) {
        let dy = doc.cursor() - remaining;
        doc.advance(dy);
    }

    #[test]
    fn section_check_breaks_below_its_threshold() {
        let mut doc = blank_document();
        leave(&mut doc, 199.0);
        assert!(ensure_space_for_section(&mut doc).unwrap());
        assert_eq!(doc.page_number(), 2);
        assert_eq!(doc.cursor(), PageGeometry::LETTER.content_height());
    }

    #[test]
    fn item_check_tolerates_tighter_packing() {
        let mut doc = blank_document();
        leave(&mut doc, 180.0);
        assert!(!ensure_space_for_item(&mut doc).unwrap());
        leave(&mut doc, 149.0);
        assert!(ensure_space_for_item(&mut doc).unwrap());
        assert_eq!(doc.page_number(), 2);
    }

    #[test]
    fn first_item_of_a_loop_never_breaks() {
        let mut doc = blank_document();
        leave(&mut doc, 20.0);
        assert!(!apply(&mut doc, Break::SectionUnlessFirst(0)).unwrap());
        assert_eq!(doc.page_number(), 1);
        assert!(apply(&mut doc, Break::SectionUnlessFirst(1)).unwrap());
        assert_eq!(doc.page_number(), 2);
    }

    #[test]
    fn fresh_page_is_never_broken_again() {
        let mut doc = blank_document();
        let tiny = PageGeometry {
            page_height: 300.0,
            ..PageGeometry::LETTER
        };
        doc.geometry = tiny;
        doc.start_new_page().unwrap();
        assert!(doc.cursor() < SECTION_THRESHOLD);
        assert!(!ensure_space_for_section(&mut doc).unwrap());
        assert_eq!(doc.page_number(), 2);
    }

    #[test]
    fn cursor_never_goes_negative() {
        let mut doc = blank_document();
        doc.advance(10_000.0);
        assert_eq!(doc.cursor(), 0.0);
        assert!(apply(&mut doc, Break::Item).unwrap());
        assert!(doc.cursor() > 0.0 && doc.cursor() <= PageGeometry::LETTER.content_height());
    }
}
