mod common;

use std::io::Cursor;

use worksheet_pdf::model::{
    AbcWorksheet, AlternativeThought, Baseline, NarrativeView, QuestionnaireView, WorksheetView,
};
use worksheet_pdf::{Error, ExportOptions, export};

fn worksheet(event: &str) -> WorksheetView {
    WorksheetView {
        worksheet: AbcWorksheet {
            activating_event: Some(event.to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn png_mark() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(4, 2, image::Rgba([37, 78, 112, 255]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

#[test]
fn unencodable_text_aborts_the_export() {
    let result = export(&worksheet("我很害怕"), &common::options());
    let Err(Error::Render(msg)) = result else {
        panic!("expected a render failure, got {result:?}");
    };
    assert!(msg.contains("ThreeColumnTable \"A: Activating Event\""), "{msg}");
    assert!(msg.contains("--font"), "{msg}");
}

#[test]
fn render_failure_inside_a_flowing_card_aborts_too() {
    let view = NarrativeView {
        thought: AlternativeThought {
            alternative_thought: Some(format!("{} \u{263a}", "ok ".repeat(400))),
            ..Default::default()
        },
        ..Default::default()
    };
    let result = export(&view, &common::options());
    let Err(Error::Render(msg)) = result else {
        panic!("expected a render failure, got {result:?}");
    };
    assert!(msg.contains("SectionCard \"Alternative Thought\""), "{msg}");
    assert!(msg.contains(worksheet_pdf::FONT_ENV), "{msg}");
}

#[test]
fn out_of_scale_answer_is_an_invalid_record() {
    let view = QuestionnaireView {
        baseline: Baseline {
            pcl_answers: vec![Some(2), Some(7)],
            ..Default::default()
        },
        ..Default::default()
    };
    assert!(matches!(export(&view, &common::options()), Err(Error::InvalidRecord(_))));
}

#[test]
fn missing_or_broken_brand_mark_is_skipped() {
    let plain = export(&worksheet("Thunder"), &common::options()).unwrap();
    assert_eq!(common::count(&plain, "/Subtype /Image"), 0);

    let broken = ExportOptions {
        brand_mark: Some(b"GIF89a but not really".to_vec()),
        ..common::options()
    };
    let bytes = export(&worksheet("Thunder"), &broken).unwrap();
    assert_eq!(common::count(&bytes, "/Subtype /Image"), 0);
    assert_eq!(bytes, plain);
}

#[test]
fn brand_mark_is_drawn_on_every_page() {
    let options = ExportOptions {
        brand_mark: Some(png_mark()),
        ..common::options()
    };
    let view = NarrativeView::default();
    let result = worksheet_pdf::layout(&view, &options).unwrap();
    let pages = result.page_count();
    let bytes = result.finish().unwrap();
    assert_eq!(common::count(&bytes, "/Subtype /Image"), 1);
    assert_eq!(common::count(&bytes, "/Im1 Do"), pages);
}
