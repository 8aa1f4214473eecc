mod common;

use worksheet_pdf::compose::{BlockKind, PlacedBlock};
use worksheet_pdf::model::{
    AbcWorksheet, AggregateView, AlternativeThought, Baseline, EmotionEntry, NarrativeView,
    QuestionnaireView, StuckPointSummary, WorksheetView,
};
use worksheet_pdf::{Layout, PageGeometry, export, layout};

fn stuck_point() -> StuckPointSummary {
    StuckPointSummary {
        category: Some("Safety".to_string()),
        statement: Some("I am never safe anywhere.".to_string()),
    }
}

/// (page number, block) for every placed block.
fn placed(layout: &Layout) -> Vec<(usize, PlacedBlock)> {
    layout
        .pages()
        .iter()
        .flat_map(|page| page.blocks.iter().map(move |b| (page.number, b.clone())))
        .collect()
}

#[test]
fn worksheet_without_emotions_says_so_in_the_table() {
    let view = WorksheetView {
        stuck_point: stuck_point(),
        worksheet: AbcWorksheet {
            activating_event: Some("Loud noise at night".to_string()),
            belief: Some("Someone is breaking in".to_string()),
            emotions: vec![EmotionEntry::new("fear", 0)],
            ..Default::default()
        },
    };
    let bytes = export(&view, &common::options()).unwrap();
    assert_eq!(common::shows(&bytes, "No emotions recorded."), 1);
    assert_eq!(common::shows(&bytes, "C: Consequence"), 1);
}

#[test]
fn worksheet_emotions_are_sorted_and_capitalized() {
    let view = WorksheetView {
        stuck_point: stuck_point(),
        worksheet: AbcWorksheet {
            emotions: vec![
                EmotionEntry::new("shame", 3),
                EmotionEntry::new("FEAR", 8),
                EmotionEntry::new("anger", 0),
            ],
            ..Default::default()
        },
    };
    let bytes = export(&view, &common::options()).unwrap();
    assert_eq!(common::shows(&bytes, "Fear: 8/10"), 1);
    assert_eq!(common::shows(&bytes, "Shame: 3/10"), 1);
    assert_eq!(common::shows(&bytes, "Anger: 0/10"), 0);
    // Missing cells fall back.
    assert_eq!(common::shows(&bytes, "Not specified"), 2);
}

#[test]
fn narrative_with_blank_prompt_groups_draws_no_prompt_cards() {
    let view = NarrativeView {
        stuck_point: stuck_point(),
        thought: AlternativeThought {
            situation: Some("At the grocery store".to_string()),
            evidence_for: Some("   ".to_string()),
            all_or_none: Some(String::new()),
            mind_reading: Some("\n".to_string()),
            ..Default::default()
        },
    };
    let result = layout(&view, &common::options()).unwrap();
    let blocks = placed(&result);

    assert!(!blocks.iter().any(|(_, b)| b.kind == BlockKind::SectionCardHeader));
    let cards: Vec<&str> = blocks
        .iter()
        .filter(|(_, b)| b.kind == BlockKind::SectionCard)
        .map(|(_, b)| b.label.as_str())
        .collect();
    assert_eq!(
        cards,
        [
            "Stuck Point",
            "Situation",
            "Stuck Point",
            "Emotions Before",
            "Alternative Thought",
            "Re-rate Old Stuck Point",
            "Emotions After",
        ]
    );

    let bytes = result.finish().unwrap();
    assert_eq!(common::shows(&bytes, "Not answered"), 0);
    // Both belief ratings and the re-rating.
    assert_eq!(common::shows(&bytes, "Not rated"), 3);
    assert_eq!(common::shows(&bytes, "No emotions recorded."), 2);
}

#[test]
fn narrative_answers_render_as_cards_under_their_group() {
    let view = NarrativeView {
        stuck_point: stuck_point(),
        thought: AlternativeThought {
            habit_or_fact: Some("Habit".to_string()),
            emotional_reasoning: Some("I feel scared so it must be dangerous".to_string()),
            alternative_thought_belief: Some(70),
            ..Default::default()
        },
    };
    let result = layout(&view, &common::options()).unwrap();
    let labels: Vec<String> = placed(&result).into_iter().map(|(_, b)| b.label).collect();
    let group = labels.iter().position(|l| l == "Exploring Questions").unwrap();
    assert_eq!(labels[group + 1], "Is this stuck point a habit or based on facts?");
    let patterns = labels
        .iter()
        .position(|l| l == "Patterns of Problematic Thinking")
        .unwrap();
    assert_eq!(labels[patterns + 1], "Emotional reasoning");

    let bytes = result.finish().unwrap();
    assert_eq!(common::shows(&bytes, "Belief in alternative thought:"), 1);
    assert_eq!(common::shows(&bytes, "70%"), 1);
}

#[test]
fn questionnaire_total_is_the_literal_sum() {
    let answers: Vec<Option<u8>> = (0..20).map(|i| Some(if i % 2 == 0 { 3 } else { 4 })).collect();
    let sum: u32 = answers.iter().flatten().map(|&v| u32::from(v)).sum();
    assert_eq!(sum, 70);

    let view = QuestionnaireView {
        baseline: Baseline {
            pcl_answers: answers,
            ..Default::default()
        },
        ..Default::default()
    };
    let result = layout(&view, &common::options()).unwrap();
    assert_eq!(result.page_count(), 3);

    let pages = result.pages();
    let total = pages[1]
        .blocks
        .iter()
        .find(|b| b.kind == BlockKind::ScoreTotal)
        .expect("total on the checklist page");
    assert!(total.cursor > 0.0);
    assert!(pages[2].blocks.iter().any(|b| b.kind == BlockKind::NarrativePanel));

    let bytes = result.finish().unwrap();
    let line = format!("Total score: {sum} / 80");
    assert_eq!(common::shows(&bytes, &line), 1);
    // Twenty marked cells.
    assert_eq!(common::shows(&bytes, "X"), 20);

    let (x, _) = common::text_origin(&bytes, &line).expect("total line positioned");
    let right = PageGeometry::LETTER.page_width - PageGeometry::LETTER.margin_right;
    let end = x + bold_width(&line, 11.0);
    assert!((end - right).abs() < 0.05, "total ends at {end}, margin at {right}");
}

/// Helvetica-Bold advance of the characters a score line uses.
fn bold_width(text: &str, size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| match c {
            '0'..='9' | 'a' | 'c' | 'e' | 's' => 556,
            'T' | 'o' => 611,
            'r' => 389,
            't' | ':' => 333,
            'l' | ' ' | '/' => 278,
            other => panic!("no advance for {other:?}"),
        })
        .sum();
    units as f32 * size / 1000.0
}

#[test]
fn aggregate_breaks_only_between_the_second_and_third_thought() {
    let thought = |situation: &str| AlternativeThought {
        situation: Some(situation.to_string()),
        ..Default::default()
    };
    let view = AggregateView {
        stuck_point: StuckPointSummary {
            category: Some("Safety".to_string()),
            statement: Some("I am never safe anywhere.".to_string()),
        },
        abc_worksheets: Vec::new(),
        alternative_thoughts: vec![
            thought("Walking home after dark."),
            thought("Waiting for the train."),
            thought("Sitting in a crowded theater."),
        ],
    };
    let result = layout(&view, &common::options()).unwrap();
    let blocks = placed(&result);

    let empty: Vec<&str> = blocks
        .iter()
        .filter(|(_, b)| b.kind == BlockKind::EmptyState)
        .map(|(_, b)| b.label.as_str())
        .collect();
    assert_eq!(empty, ["No ABC worksheets yet."]);

    let page_of = |label: &str| {
        blocks
            .iter()
            .find(|(_, b)| b.label == label)
            .map(|(page, _)| *page)
            .unwrap()
    };
    assert_eq!(page_of("Alternative Thoughts"), 1);
    assert_eq!(page_of("Alternative Thought #1"), 1);
    assert_eq!(page_of("Alternative Thought #2"), 1);
    assert_eq!(page_of("Alternative Thought #3"), 2);
    assert_eq!(result.page_count(), 2);

    let situations = blocks
        .iter()
        .filter(|(_, b)| b.kind == BlockKind::SectionCard && b.label == "Situation")
        .count();
    assert_eq!(situations, 3);
}

#[test]
fn aggregate_with_no_children_shows_two_empty_states() {
    let view = AggregateView {
        stuck_point: stuck_point(),
        ..Default::default()
    };
    let bytes = export(&view, &common::options()).unwrap();
    assert_eq!(common::shows(&bytes, "No ABC worksheets yet."), 1);
    assert_eq!(common::shows(&bytes, "No alternative thought worksheets yet."), 1);
}

/// The same aggregate with a stuck-point statement of `words` words, which
/// slides everything after it down the first page.
fn shifted(words: usize, abc_worksheets: Vec<AbcWorksheet>, thoughts: Vec<AlternativeThought>) -> AggregateView {
    AggregateView {
        stuck_point: StuckPointSummary {
            category: Some("Safety".to_string()),
            statement: Some(vec!["unsafe"; words].join(" ")),
        },
        abc_worksheets,
        alternative_thoughts: thoughts,
    }
}

/// Page of every block that directly follows a header with `prefix`, next to
/// the header's own page.
fn header_pages(layout: &Layout, prefix: &str) -> Vec<(String, usize, usize)> {
    let blocks = placed(layout);
    blocks
        .windows(2)
        .filter(|w| w[0].1.kind == BlockKind::SectionCardHeader && w[0].1.label.starts_with(prefix))
        .map(|w| (w[0].1.label.clone(), w[0].0, w[1].0))
        .collect()
}

#[test]
fn first_thought_never_leaves_its_banner_and_header_behind() {
    let thought = AlternativeThought {
        situation: Some("Walking home after dark.".to_string()),
        ..Default::default()
    };
    for words in (150..=330).step_by(3) {
        let view = shifted(words, Vec::new(), vec![thought.clone()]);
        let result = layout(&view, &common::options()).unwrap();
        let blocks = placed(&result);
        let banner = blocks
            .iter()
            .position(|(_, b)| b.label == "Alternative Thoughts")
            .unwrap();
        let pages: Vec<usize> = blocks[banner..banner + 3].iter().map(|(p, _)| *p).collect();
        assert_eq!(
            blocks[banner + 2].1.label,
            "Situation",
            "{words} words: unexpected block order"
        );
        assert!(
            pages.iter().all(|p| *p == pages[0]),
            "{words} words: banner, header and first card on pages {pages:?}"
        );
    }
}

#[test]
fn abc_header_stays_with_its_table() {
    let event = vec!["noise"; 80].join(" ");
    let worksheet = AbcWorksheet {
        activating_event: Some(event),
        belief: Some("Someone is breaking in".to_string()),
        emotions: vec![EmotionEntry::new("fear", 9)],
        ..Default::default()
    };
    for words in (0..=300).step_by(5) {
        let view = shifted(words, vec![worksheet.clone(); 2], Vec::new());
        let result = layout(&view, &common::options()).unwrap();
        let headers = header_pages(&result, "ABC Worksheet #");
        assert_eq!(headers.len(), 2);
        for (label, header_page, table_page) in headers {
            assert_eq!(header_page, table_page, "{words} words: {label:?} split from its table");
        }
    }
}
