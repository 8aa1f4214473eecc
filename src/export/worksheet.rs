use crate::compose::Step;
use crate::error::Error;
use crate::model::WorksheetView;

use super::{Exporter, abc_table, banner, dated, stuck_point_cards};

impl Exporter for WorksheetView {
    fn subtitle(&self) -> &str {
        "ABC Worksheet"
    }

    fn compose(&self) -> Result<Vec<Step>, Error> {
        let mut steps = vec![Step::block(banner(dated(
            "ABC Worksheet",
            self.worksheet.created_on,
        )))];
        steps.extend(stuck_point_cards(&self.stuck_point));
        steps.push(Step::section(abc_table(&self.worksheet)));
        Ok(steps)
    }
}
