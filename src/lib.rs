pub mod compose;
pub mod emotions;
mod error;
mod export;
mod fonts;
pub mod model;
mod options;
mod pdf;

pub use error::Error;
pub use export::{Exporter, PCL_ITEMS, PCL_MAX, pcl_total};
pub use options::{BOLD_FONT_ENV, ExportOptions, FONT_ENV, PageGeometry, PageNumberStyle};
pub use pdf::{Layout, PageSummary};

use std::path::Path;
use std::time::Instant;

use compose::Composer;
use fonts::FontSet;
use model::{AggregateView, NarrativeView, QuestionnaireView, WorksheetView};
use pdf::Document;
use pdf::frame::{self, Masthead};

/// Which exporter a JSON record is read for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKind {
    Worksheet,
    Narrative,
    Questionnaire,
    Aggregate,
}

/// Compose and paginate `view`. The page count of the returned layout is
/// final; page numbers are stamped by [`Layout::finish`].
pub fn layout<E: Exporter + ?Sized>(view: &E, options: &ExportOptions) -> Result<Layout, Error> {
    let t0 = Instant::now();

    let steps = view.compose()?;
    let t_compose = t0.elapsed();

    let (regular, bold) = options.font_paths();
    let fonts = FontSet::load(regular.as_deref(), bold.as_deref())?;
    let mut images = Vec::new();
    let mark_size = frame::load_brand_mark(options.brand_mark.as_deref()).map(|(image, size)| {
        images.push(image);
        size
    });
    let overlay = Masthead {
        brand_name: options.brand_name.clone(),
        subtitle: view.subtitle().to_string(),
        printed_on: options.printed_on,
        mark_size,
    }
    .into_overlay();
    let doc = Document::new(options.geometry, fonts, images, overlay)?;
    let t_setup = t0.elapsed();

    let step_count = steps.len();
    let doc = Composer::new(doc).run(steps)?;
    let layout = doc.into_layout(
        view.subtitle().to_string(),
        options.compress,
        options.page_numbers,
    );
    let t_total = t0.elapsed();

    log::info!(
        "Layout phases: compose={:.1}ms, setup={:.1}ms, paginate={:.1}ms ({} steps, {} pages)",
        t_compose.as_secs_f64() * 1000.0,
        (t_setup - t_compose).as_secs_f64() * 1000.0,
        (t_total - t_setup).as_secs_f64() * 1000.0,
        step_count,
        layout.page_count(),
    );
    Ok(layout)
}

/// Render `view` to PDF bytes. Nothing is returned unless every block laid
/// out.
pub fn export<E: Exporter + ?Sized>(view: &E, options: &ExportOptions) -> Result<Vec<u8>, Error> {
    layout(view, options)?.finish()
}

/// Deserialize a JSON record as `kind` and export it.
pub fn export_json(kind: RecordKind, json: &[u8], options: &ExportOptions) -> Result<Vec<u8>, Error> {
    match kind {
        RecordKind::Worksheet => export(&serde_json::from_slice::<WorksheetView>(json)?, options),
        RecordKind::Narrative => export(&serde_json::from_slice::<NarrativeView>(json)?, options),
        RecordKind::Questionnaire => {
            export(&serde_json::from_slice::<QuestionnaireView>(json)?, options)
        }
        RecordKind::Aggregate => export(&serde_json::from_slice::<AggregateView>(json)?, options),
    }
}

pub fn convert_json_to_pdf(
    kind: RecordKind,
    input: &Path,
    output: &Path,
    options: &ExportOptions,
) -> Result<(), Error> {
    let t0 = Instant::now();

    let json = std::fs::read(input)?;
    let t_read = t0.elapsed();

    let bytes = export_json(kind, &json, options)?;
    let t_render = t0.elapsed();

    std::fs::write(output, &bytes)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: read={:.1}ms, render={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_read.as_secs_f64() * 1000.0,
        (t_render - t_read).as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(())
}
