use crate::compose::{Block, Break, Emphasis, FreeText, NOT_SPECIFIED, NOT_YET_WRITTEN, Step};
use crate::emotions::{format_emotions, has_emotions};
use crate::error::Error;
use crate::model::{AlternativeThought, NarrativeView, non_blank, or_fallback};

use super::{Exporter, banner, card, dated, percent, percent_text};

/// One prompt of a fixed question group.
struct Prompt {
    id: &'static str,
    label: &'static str,
    answer: fn(&AlternativeThought) -> Option<&str>,
}

const EXPLORING_QUESTIONS: [Prompt; 10] = [
    Prompt {
        id: "evidence_for",
        label: "What is the evidence for this stuck point?",
        answer: |t| t.evidence_for.as_deref(),
    },
    Prompt {
        id: "evidence_against",
        label: "What is the evidence against this stuck point?",
        answer: |t| t.evidence_against.as_deref(),
    },
    Prompt {
        id: "habit_or_fact",
        label: "Is this stuck point a habit or based on facts?",
        answer: |t| t.habit_or_fact.as_deref(),
    },
    Prompt {
        id: "interpretations_not_accurate",
        label: "In what ways is your interpretation of the situation not accurate?",
        answer: |t| t.interpretations_not_accurate.as_deref(),
    },
    Prompt {
        id: "all_or_none",
        label: "Are you thinking in all-or-none terms?",
        answer: |t| t.all_or_none.as_deref(),
    },
    Prompt {
        id: "extreme_or_exaggerated",
        label: "Are you using words or phrases that are extreme or exaggerated?",
        answer: |t| t.extreme_or_exaggerated.as_deref(),
    },
    Prompt {
        id: "out_of_context",
        label: "Are you focusing on only one part of the event and taking it out of context?",
        answer: |t| t.out_of_context.as_deref(),
    },
    Prompt {
        id: "source_reliable",
        label: "Is the source of information reliable?",
        answer: |t| t.source_reliable.as_deref(),
    },
    Prompt {
        id: "low_vs_high_probability",
        label: "Are you confusing something that is possible with something that is likely?",
        answer: |t| t.low_vs_high_probability.as_deref(),
    },
    Prompt {
        id: "based_on_feelings",
        label: "Are your judgments based on feelings rather than facts?",
        answer: |t| t.based_on_feelings.as_deref(),
    },
];

const THINKING_PATTERNS: [Prompt; 7] = [
    Prompt {
        id: "jumping_to_conclusions",
        label: "Jumping to conclusions",
        answer: |t| t.jumping_to_conclusions.as_deref(),
    },
    Prompt {
        id: "exaggerating_or_minimizing",
        label: "Exaggerating or minimizing",
        answer: |t| t.exaggerating_or_minimizing.as_deref(),
    },
    Prompt {
        id: "disregarding_important_aspects",
        label: "Disregarding important aspects",
        answer: |t| t.disregarding_important_aspects.as_deref(),
    },
    Prompt {
        id: "oversimplifying",
        label: "Oversimplifying things as good or bad, right or wrong",
        answer: |t| t.oversimplifying.as_deref(),
    },
    Prompt {
        id: "overgeneralizing",
        label: "Overgeneralizing from a single incident",
        answer: |t| t.overgeneralizing.as_deref(),
    },
    Prompt {
        id: "mind_reading",
        label: "Mind reading",
        answer: |t| t.mind_reading.as_deref(),
    },
    Prompt {
        id: "emotional_reasoning",
        label: "Emotional reasoning",
        answer: |t| t.emotional_reasoning.as_deref(),
    },
];

/// Which sections of a worksheet are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Sections {
    /// Standalone export: fixed sections always appear with their fallbacks.
    Full,
    /// Nested in an aggregate: anything left blank is omitted.
    AnsweredOnly,
}

impl Sections {
    fn card_break(self) -> Break {
        match self {
            Sections::Full => Break::Section,
            Sections::AnsweredOnly => Break::Item,
        }
    }
}

fn inline_card(title: &str, body: String) -> Block {
    Block::SectionCard {
        title: title.to_string(),
        body: FreeText::literal(body),
        inline_format: true,
    }
}

/// A rated statement such as the stuck point with its belief percentage.
fn rated_statement(text: Option<&str>, rating_label: &str, rating: Option<u8>) -> String {
    format!(
        "{}\n\n**{rating_label}:** {}",
        or_fallback(text, NOT_YET_WRITTEN),
        percent_text(rating)
    )
}

fn prompt_group(
    steps: &mut Vec<Step>,
    thought: &AlternativeThought,
    title: &str,
    prompts: &[Prompt],
    brk: Break,
) {
    let answered: Vec<(&Prompt, &str)> = prompts
        .iter()
        .filter_map(|p| non_blank((p.answer)(thought)).map(|a| (p, a)))
        .collect();
    if answered.is_empty() {
        log::debug!("No answers under {title:?}; group omitted");
        return;
    }
    log::debug!(
        "{title:?}: answered {:?}",
        answered.iter().map(|(p, _)| p.id).collect::<Vec<_>>()
    );
    steps.push(Step::Block(
        brk,
        Block::SectionCardHeader {
            title: title.to_string(),
            emphasis: Emphasis::Standard,
        },
    ));
    for (prompt, answer) in answered {
        steps.push(Step::item(card(prompt.label, FreeText::literal(answer))));
    }
}

/// The eight worksheet sections in their fixed order.
pub(super) fn sections(thought: &AlternativeThought, mode: Sections) -> Vec<Step> {
    let brk = mode.card_break();
    let full = mode == Sections::Full;
    let mut steps = Vec::new();

    if full || non_blank(thought.situation.as_deref()).is_some() {
        steps.push(Step::Block(
            brk,
            card(
                "Situation",
                FreeText::new(thought.situation.as_deref(), NOT_YET_WRITTEN),
            ),
        ));
    }

    if full
        || non_blank(thought.stuck_point.as_deref()).is_some()
        || thought.stuck_point_belief_before.is_some()
    {
        steps.push(Step::Block(
            brk,
            inline_card(
                "Stuck Point",
                rated_statement(
                    thought.stuck_point.as_deref(),
                    "Belief in stuck point",
                    thought.stuck_point_belief_before,
                ),
            ),
        ));
    }

    if full || has_emotions(&thought.emotions_before) {
        steps.push(Step::Block(
            brk,
            card(
                "Emotions Before",
                FreeText::literal(format_emotions(&thought.emotions_before, "\n")),
            ),
        ));
    }

    prompt_group(&mut steps, thought, "Exploring Questions", &EXPLORING_QUESTIONS, brk);
    prompt_group(
        &mut steps,
        thought,
        "Patterns of Problematic Thinking",
        &THINKING_PATTERNS,
        brk,
    );

    if full
        || non_blank(thought.alternative_thought.as_deref()).is_some()
        || thought.alternative_thought_belief.is_some()
    {
        steps.push(Step::Block(
            brk,
            inline_card(
                "Alternative Thought",
                rated_statement(
                    thought.alternative_thought.as_deref(),
                    "Belief in alternative thought",
                    thought.alternative_thought_belief,
                ),
            ),
        ));
    }

    if full || thought.stuck_point_belief_after.is_some() {
        steps.push(Step::Block(
            brk,
            card(
                "Re-rate Old Stuck Point",
                percent(thought.stuck_point_belief_after),
            ),
        ));
    }

    if full || has_emotions(&thought.emotions_after) {
        steps.push(Step::Block(
            brk,
            card(
                "Emotions After",
                FreeText::literal(format_emotions(&thought.emotions_after, "\n")),
            ),
        ));
    }

    steps
}

impl Exporter for NarrativeView {
    fn subtitle(&self) -> &str {
        "Alternative Thought Worksheet"
    }

    fn compose(&self) -> Result<Vec<Step>, Error> {
        let mut steps = vec![
            Step::block(banner(dated(
                "Alternative Thought Worksheet",
                self.thought.created_on,
            ))),
            Step::block(card(
                "Stuck Point",
                FreeText::new(self.stuck_point.statement.as_deref(), NOT_SPECIFIED),
            )),
        ];
        steps.extend(sections(&self.thought, Sections::Full));
        Ok(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::BlockKind;
    use crate::model::EmotionEntry;

    fn titles(steps: &[Step]) -> Vec<(BlockKind, String)> {
        steps
            .iter()
            .filter_map(|step| match step {
                Step::Block(_, block @ Block::SectionCard { title, .. })
                | Step::Block(_, block @ Block::SectionCardHeader { title, .. }) => {
                    Some((block.kind(), title.clone()))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn blank_and_absent_answers_are_both_skipped() {
        let thought = AlternativeThought {
            evidence_for: Some("   ".to_string()),
            mind_reading: Some(String::new()),
            ..Default::default()
        };
        let steps = sections(&thought, Sections::Full);
        let titles = titles(&steps);
        assert_eq!(titles.len(), 6);
        assert!(titles.iter().all(|(kind, _)| *kind == BlockKind::SectionCard));
    }

    #[test]
    fn answered_prompts_keep_their_fixed_order() {
        let thought = AlternativeThought {
            based_on_feelings: Some("Mostly".to_string()),
            evidence_for: Some("It happened".to_string()),
            ..Default::default()
        };
        let steps = sections(&thought, Sections::Full);
        let titles = titles(&steps);
        let header = titles
            .iter()
            .position(|(_, t)| t == "Exploring Questions")
            .unwrap();
        assert_eq!(titles[header + 1].1, EXPLORING_QUESTIONS[0].label);
        assert_eq!(titles[header + 2].1, EXPLORING_QUESTIONS[9].label);
        assert!(!titles.iter().any(|(_, t)| t == "Patterns of Problematic Thinking"));
    }

    #[test]
    fn nested_sections_omit_everything_blank() {
        let thought = AlternativeThought {
            situation: Some("At the store".to_string()),
            emotions_after: vec![EmotionEntry::new("calm", 6)],
            emotions_before: vec![EmotionEntry::new("fear", 0)],
            ..Default::default()
        };
        let steps = sections(&thought, Sections::AnsweredOnly);
        let titles: Vec<String> = titles(&steps).into_iter().map(|(_, t)| t).collect();
        assert_eq!(titles, ["Situation", "Emotions After"]);
        assert!(steps.iter().all(|s| matches!(s, Step::Block(Break::Item, _))));
    }

    #[test]
    fn ratings_render_with_inline_labels() {
        let body = rated_statement(Some("I should have known"), "Belief in stuck point", Some(80));
        assert_eq!(body, "I should have known\n\n**Belief in stuck point:** 80%");
        let unrated = rated_statement(None, "Belief in alternative thought", None);
        assert_eq!(unrated, "Not yet written.\n\n**Belief in alternative thought:** Not rated");
    }
}
