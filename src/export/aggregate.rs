use crate::compose::{Block, Break, Emphasis, Step};
use crate::error::Error;
use crate::model::AggregateView;

use super::narrative::{Sections, sections};
use super::{Exporter, abc_table, banner, dated, stuck_point_cards};

pub(crate) const NO_ABC_WORKSHEETS: &str = "No ABC worksheets yet.";
pub(crate) const NO_ALTERNATIVE_THOUGHTS: &str = "No alternative thought worksheets yet.";

fn dark_header(title: String) -> Block {
    Block::SectionCardHeader {
        title,
        emphasis: Emphasis::Dark,
    }
}

fn empty_state(message: &str) -> Step {
    Step::block(Block::EmptyState {
        message: message.to_string(),
    })
}

impl Exporter for AggregateView {
    fn subtitle(&self) -> &str {
        "Stuck Point Summary"
    }

    fn compose(&self) -> Result<Vec<Step>, Error> {
        let mut steps = vec![Step::block(banner("Stuck Point Summary"))];
        steps.extend(stuck_point_cards(&self.stuck_point));

        steps.push(Step::section(banner("ABC Worksheets")));
        if self.abc_worksheets.is_empty() {
            steps.push(empty_state(NO_ABC_WORKSHEETS));
        }
        for (i, worksheet) in self.abc_worksheets.iter().enumerate() {
            let title = dated(&format!("ABC Worksheet #{}", i + 1), worksheet.created_on);
            steps.push(Step::item(dark_header(title)));
            steps.push(Step::block(abc_table(worksheet)));
        }

        steps.push(Step::section(banner("Alternative Thoughts")));
        // Checked once up front; the per-item breaks below never see it.
        if self.alternative_thoughts.is_empty() {
            steps.push(empty_state(NO_ALTERNATIVE_THOUGHTS));
        }
        for (i, thought) in self.alternative_thoughts.iter().enumerate() {
            let title = dated(&format!("Alternative Thought #{}", i + 1), thought.created_on);
            steps.push(Step::Block(Break::SectionUnlessFirst(i), dark_header(title)));
            let mut nested = sections(thought, Sections::AnsweredOnly);
            // The header's own check already placed the item.
            if let Some(Step::Block(brk, _)) = nested.first_mut() {
                *brk = Break::None;
            }
            steps.extend(nested);
        }

        Ok(steps)
    }
}
