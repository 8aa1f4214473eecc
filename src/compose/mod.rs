//! Block stream composition: the closed set of blocks an exporter can ask
//! for, the break policy that runs before each one, and the composer that
//! lays a stream out onto a [`Document`](crate::pdf::Document).

mod blocks;
pub(crate) mod pagination;

use crate::error::Error;
use crate::model::or_fallback;
use crate::pdf::Document;

pub use pagination::{ITEM_THRESHOLD, SECTION_THRESHOLD};

pub const NOT_SPECIFIED: &str = "Not specified";
pub const NOT_YET_WRITTEN: &str = "Not yet written.";
pub const NOT_RATED: &str = "Not rated";
pub const NOT_ANSWERED: &str = "Not answered";

/// Free text paired with the literal shown when it is absent or blank.
#[derive(Clone, Debug, PartialEq)]
pub struct FreeText {
    pub value: Option<String>,
    pub fallback: &'static str,
}

impl FreeText {
    pub fn new(value: Option<&str>, fallback: &'static str) -> Self {
        Self {
            value: value.map(str::to_owned),
            fallback,
        }
    }

    /// Text that is always present; the fallback never shows.
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            fallback: NOT_SPECIFIED,
        }
    }

    pub fn resolve(&self) -> &str {
        or_fallback(self.value.as_deref(), self.fallback)
    }
}

/// Two-line column caption: a bold caption over a short gloss.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnCaption {
    pub caption: String,
    pub gloss: String,
}

impl ColumnCaption {
    pub fn new(caption: impl Into<String>, gloss: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
            gloss: gloss.into(),
        }
    }
}

/// One row of a rating grid. `marked` indexes the response columns.
#[derive(Clone, Debug, PartialEq)]
pub struct RatingRow {
    pub label: String,
    pub marked: Option<usize>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Emphasis {
    #[default]
    Standard,
    Dark,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    BannerHeader {
        title: String,
    },
    SectionCard {
        title: String,
        body: FreeText,
        /// Interpret `**bold**` spans in the body.
        inline_format: bool,
    },
    SectionCardHeader {
        title: String,
        emphasis: Emphasis,
    },
    ThreeColumnTable {
        headers: [ColumnCaption; 3],
        rows: Vec<[FreeText; 3]>,
    },
    AlternatingTable {
        /// The question column caption followed by one caption per response.
        headers: Vec<String>,
        rows: Vec<RatingRow>,
    },
    LabeledField {
        label: String,
        value: FreeText,
    },
    CheckboxItem {
        text: String,
        checked: bool,
    },
    EmptyState {
        message: String,
    },
    Paragraph {
        text: String,
    },
    Subheading {
        text: String,
    },
    BulletList {
        items: Vec<String>,
    },
    ScoreTotal {
        label: String,
        value: String,
    },
    NarrativePanel {
        text: FreeText,
    },
    Spacer(f32),
}

impl Block {
    /// Banners and card headers, which stay on the page of what follows them.
    pub fn is_header(&self) -> bool {
        matches!(self, Block::BannerHeader { .. } | Block::SectionCardHeader { .. })
    }

    /// The title or caption a reader would find the block by.
    pub fn label(&self) -> &str {
        match self {
            Block::BannerHeader { title }
            | Block::SectionCard { title, .. }
            | Block::SectionCardHeader { title, .. } => title,
            Block::ThreeColumnTable { headers, .. } => &headers[0].caption,
            Block::AlternatingTable { headers, .. } => headers.first().map_or("", String::as_str),
            Block::LabeledField { label, .. } | Block::ScoreTotal { label, .. } => label,
            Block::CheckboxItem { text, .. }
            | Block::Paragraph { text }
            | Block::Subheading { text } => text,
            Block::EmptyState { message } => message,
            Block::BulletList { items } => items.first().map_or("", String::as_str),
            Block::NarrativePanel { .. } | Block::Spacer(_) => "",
        }
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            Block::BannerHeader { .. } => BlockKind::BannerHeader,
            Block::SectionCard { .. } => BlockKind::SectionCard,
            Block::SectionCardHeader { .. } => BlockKind::SectionCardHeader,
            Block::ThreeColumnTable { .. } => BlockKind::ThreeColumnTable,
            Block::AlternatingTable { .. } => BlockKind::AlternatingTable,
            Block::LabeledField { .. } => BlockKind::LabeledField,
            Block::CheckboxItem { .. } => BlockKind::CheckboxItem,
            Block::EmptyState { .. } => BlockKind::EmptyState,
            Block::Paragraph { .. } => BlockKind::Paragraph,
            Block::Subheading { .. } => BlockKind::Subheading,
            Block::BulletList { .. } => BlockKind::BulletList,
            Block::ScoreTotal { .. } => BlockKind::ScoreTotal,
            Block::NarrativePanel { .. } => BlockKind::NarrativePanel,
            Block::Spacer(_) => BlockKind::Spacer,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockKind {
    BannerHeader,
    SectionCard,
    SectionCardHeader,
    ThreeColumnTable,
    AlternatingTable,
    LabeledField,
    CheckboxItem,
    EmptyState,
    Paragraph,
    Subheading,
    BulletList,
    ScoreTotal,
    NarrativePanel,
    Spacer,
}

/// Which pagination check runs before a block is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Break {
    #[default]
    None,
    Section,
    Item,
    /// The section check, skipped for the first item of a loop.
    SectionUnlessFirst(usize),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    /// Unconditional page break.
    Page,
    Block(Break, Block),
}

impl Step {
    pub fn block(block: Block) -> Self {
        Step::Block(Break::None, block)
    }

    pub fn section(block: Block) -> Self {
        Step::Block(Break::Section, block)
    }

    pub fn item(block: Block) -> Self {
        Step::Block(Break::Item, block)
    }
}

/// Where a block started: its kind, a short label and the cursor value at
/// the moment drawing began.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedBlock {
    pub kind: BlockKind,
    pub label: String,
    pub cursor: f32,
}

/// Lays a step stream out onto a document it owns for the duration.
pub(crate) struct Composer {
    doc: Document,
}

impl Composer {
    pub(crate) fn new(doc: Document) -> Self {
        Self { doc }
    }

    pub(crate) fn run(mut self, steps: Vec<Step>) -> Result<Document, Error> {
        let mut follows_header = false;
        for (i, step) in steps.iter().enumerate() {
            match step {
                Step::Page => {
                    self.doc.start_new_page()?;
                    follows_header = false;
                }
                Step::Block(brk, block) => {
                    if pagination::apply(&mut self.doc, *brk)? {
                        follows_header = false;
                    }
                    let keep_with_next = if block.is_header() {
                        self.lead(&steps[i + 1..])?
                    } else {
                        0.0
                    };
                    let flow = blocks::Flow {
                        keep_with_next,
                        follows_header,
                    };
                    blocks::emit(&mut self.doc, block, flow).map_err(|e| in_block(e, block))?;
                    follows_header = block.is_header();
                }
            }
        }
        Ok(self.doc)
    }

    /// Space the run of headers at the front of `rest`, plus the block they
    /// introduce, needs on the current page.
    fn lead(&self, rest: &[Step]) -> Result<f32, Error> {
        let mut total = 0.0;
        for step in rest {
            let Step::Block(_, block) = step else {
                break;
            };
            total += blocks::lead(&self.doc, block)?;
            if !block.is_header() {
                break;
            }
        }
        Ok(total)
    }
}

/// Name the block a render failure happened in.
fn in_block(err: Error, block: &Block) -> Error {
    match err {
        Error::Render(msg) if !block.label().is_empty() => {
            Error::Render(format!("{:?} {:?}: {msg}", block.kind(), block.label()))
        }
        Error::Render(msg) => Error::Render(format!("{:?}: {msg}", block.kind())),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_absent_text_share_a_fallback() {
        assert_eq!(FreeText::new(None, NOT_YET_WRITTEN).resolve(), NOT_YET_WRITTEN);
        assert_eq!(FreeText::new(Some("  \n "), NOT_SPECIFIED).resolve(), NOT_SPECIFIED);
        assert_eq!(FreeText::new(Some(" kept "), NOT_SPECIFIED).resolve(), "kept");
    }

    #[test]
    fn render_failures_name_their_block() {
        let block = Block::SectionCard {
            title: "Situation".to_string(),
            body: FreeText::literal("x"),
            inline_format: false,
        };
        let err = in_block(Error::Render("bad glyph".to_string()), &block);
        assert_eq!(err.to_string(), "render failure: SectionCard \"Situation\": bad glyph");
        let other = in_block(Error::InvalidRecord("n".to_string()), &block);
        assert!(matches!(other, Error::InvalidRecord(_)));
    }

    #[test]
    fn only_banners_and_card_headers_are_headers() {
        assert!(Block::BannerHeader { title: "A".to_string() }.is_header());
        assert!(
            Block::SectionCardHeader {
                title: "B".to_string(),
                emphasis: Emphasis::Dark
            }
            .is_header()
        );
        assert!(!Block::Spacer(1.0).is_header());
    }

    #[test]
    fn step_helpers_pick_the_break() {
        let block = Block::Spacer(4.0);
        assert_eq!(Step::item(block.clone()), Step::Block(Break::Item, block.clone()));
        assert_eq!(Step::block(block.clone()), Step::Block(Break::None, block));
    }
}
