//! The four document scripts. Each turns one record view into a step stream;
//! none of them touches the page or the cursor.

mod aggregate;
mod narrative;
mod questionnaire;
mod worksheet;

use chrono::NaiveDate;

use crate::compose::{Block, ColumnCaption, FreeText, NOT_RATED, NOT_SPECIFIED, Step};
use crate::emotions::format_emotions;
use crate::error::Error;
use crate::model::{AbcWorksheet, StuckPointSummary};

pub use questionnaire::{PCL_ITEMS, PCL_MAX, pcl_total};

/// A record view that knows how to lay itself out.
pub trait Exporter {
    /// Shown under the brand name on every page and used as the PDF title.
    fn subtitle(&self) -> &str;

    /// The block stream for this record. Composing the same view twice
    /// yields the same stream.
    fn compose(&self) -> Result<Vec<Step>, Error>;
}

pub(crate) fn banner(title: impl Into<String>) -> Block {
    Block::BannerHeader { title: title.into() }
}

pub(crate) fn card(title: impl Into<String>, body: FreeText) -> Block {
    Block::SectionCard {
        title: title.into(),
        body,
        inline_format: false,
    }
}

/// "ABC Worksheet (March 3, 2025)", or just the title when undated.
pub(crate) fn dated(title: &str, date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => format!("{title} ({})", d.format("%B %-d, %Y")),
        None => title.to_string(),
    }
}

pub(crate) fn percent_text(value: Option<u8>) -> String {
    match value {
        Some(v) => format!("{v}%"),
        None => NOT_RATED.to_string(),
    }
}

pub(crate) fn percent(value: Option<u8>) -> FreeText {
    FreeText {
        value: value.map(|v| format!("{v}%")),
        fallback: NOT_RATED,
    }
}

/// Parent classification and belief statement.
pub(crate) fn stuck_point_cards(stuck_point: &StuckPointSummary) -> [Step; 2] {
    [
        Step::section(card(
            "Stuck Point Category",
            FreeText::new(stuck_point.category.as_deref(), NOT_SPECIFIED),
        )),
        Step::block(card(
            "Stuck Point",
            FreeText::new(stuck_point.statement.as_deref(), NOT_SPECIFIED),
        )),
    ]
}

/// The A-B-C table. The consequence column lists the recorded emotions.
pub(crate) fn abc_table(worksheet: &AbcWorksheet) -> Block {
    Block::ThreeColumnTable {
        headers: [
            ColumnCaption::new("A: Activating Event", "Something happens"),
            ColumnCaption::new("B: Belief / Stuck Point", "I tell myself something"),
            ColumnCaption::new("C: Consequence", "I feel something"),
        ],
        rows: vec![[
            FreeText::new(worksheet.activating_event.as_deref(), NOT_SPECIFIED),
            FreeText::new(worksheet.belief.as_deref(), NOT_SPECIFIED),
            FreeText::literal(format_emotions(&worksheet.emotions, "\n")),
        ]],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotions::NO_EMOTIONS;

    #[test]
    fn percentages_fall_back_to_not_rated() {
        assert_eq!(percent_text(Some(70)), "70%");
        assert_eq!(percent_text(None), "Not rated");
        assert_eq!(percent(Some(0)).resolve(), "0%");
        assert_eq!(percent(None).resolve(), "Not rated");
    }

    #[test]
    fn abc_table_shows_emotions_in_the_third_column() {
        let worksheet = AbcWorksheet::default();
        let Block::ThreeColumnTable { rows, .. } = abc_table(&worksheet) else {
            panic!("expected a three-column table");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0].resolve(), "Not specified");
        assert_eq!(rows[0][2].resolve(), NO_EMOTIONS);
    }

    #[test]
    fn dated_titles() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 3);
        assert_eq!(dated("ABC Worksheet", date), "ABC Worksheet (March 3, 2025)");
        assert_eq!(dated("ABC Worksheet", None), "ABC Worksheet");
    }
}
