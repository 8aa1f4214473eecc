use crate::compose::{Block, FreeText, NOT_ANSWERED, NOT_YET_WRITTEN, RatingRow, Step};
use crate::error::Error;
use crate::model::{Baseline, DeathCause, ExperienceType, QuestionnaireView};

use super::{Exporter, banner};

/// Highest PCL-5 total: 20 items scored 0..=4.
pub const PCL_MAX: u32 = 80;
const PCL_MAX_ANSWER: u8 = 4;

pub const PCL_ITEMS: [&str; 20] = [
    "Repeated, disturbing, and unwanted memories of the stressful experience?",
    "Repeated, disturbing dreams of the stressful experience?",
    "Suddenly feeling or acting as if the stressful experience were actually happening again (as if you were actually back there reliving it)?",
    "Feeling very upset when something reminded you of the stressful experience?",
    "Having strong physical reactions when something reminded you of the stressful experience (for example, heart pounding, trouble breathing, sweating)?",
    "Avoiding memories, thoughts, or feelings related to the stressful experience?",
    "Avoiding external reminders of the stressful experience (for example, people, places, conversations, activities, objects, or situations)?",
    "Trouble remembering important parts of the stressful experience?",
    "Having strong negative beliefs about yourself, other people, or the world (for example, having thoughts such as: I am bad, there is something seriously wrong with me, no one can be trusted, the world is completely dangerous)?",
    "Blaming yourself or someone else for the stressful experience or what happened after it?",
    "Having strong negative feelings such as fear, horror, anger, guilt, or shame?",
    "Loss of interest in activities that you used to enjoy?",
    "Feeling distant or cut off from other people?",
    "Trouble experiencing positive feelings (for example, being unable to feel happiness or have loving feelings for people close to you)?",
    "Irritable behavior, angry outbursts, or acting aggressively?",
    "Taking too many risks or doing things that could cause you harm?",
    "Being \"superalert\" or watchful or on guard?",
    "Feeling jumpy or easily startled?",
    "Having difficulty concentrating?",
    "Trouble falling or staying asleep?",
];

const PCL_CHOICES: [&str; 5] = ["Not at all", "A little bit", "Moderately", "Quite a bit", "Extremely"];

const EVENT_INSTRUCTIONS: &str = "Think about the most stressful experience you have been through, the one that bothers you most right now. Answer the questions below about that experience. The questionnaire that follows refers to it as the stressful experience.";

const THREAT_QUESTION: &str =
    "Did it involve actual or threatened death, serious injury, or sexual violence?";

const EXPERIENCE_QUESTION: &str = "How did you experience it?";

const EXPERIENCE_CHOICES: [(ExperienceType, &str); 5] = [
    (ExperienceType::DirectlyExperienced, "It happened to me directly"),
    (ExperienceType::Witnessed, "I witnessed it"),
    (
        ExperienceType::LearnedAbout,
        "I learned about it happening to a close family member or close friend",
    ),
    (
        ExperienceType::RepeatedExposure,
        "I was repeatedly exposed to details about it as part of my job (for example, paramedic, police, military, or other first responder)",
    ),
    (ExperienceType::Other, "Other"),
];

const DEATH_QUESTION: &str = "If the event involved the death of a close family member or close friend, was it due to some kind of accident or violence, or was it due to natural causes?";

const DEATH_CHOICES: [(DeathCause, &str); 3] = [
    (DeathCause::AccidentOrViolence, "Accident or violence"),
    (DeathCause::NaturalCauses, "Natural causes"),
    (
        DeathCause::NotApplicable,
        "Not applicable (the event did not involve the death of a close family member or close friend)",
    ),
];

const PCL_PROMPT: &str = "In the past month, how much were you bothered by:";

const IMPACT_INSTRUCTIONS: &str = "Write at least one page on what it means to you that this traumatic experience happened. Consider the questions below as you write.";

const IMPACT_PROMPTS: [&str; 7] = [
    "Why do you think this traumatic event happened?",
    "How has the event changed your beliefs about yourself, other people, and the world?",
    "Safety: your beliefs about your own safety and the danger other people pose.",
    "Trust: your beliefs about trusting your own judgment and trusting others.",
    "Power and control: your beliefs about controlling your own life and other people.",
    "Esteem: your beliefs about your own worth and the worth of others.",
    "Intimacy: your beliefs about closeness with yourself and with others.",
];

/// Sum of the answered PCL-5 items. Unanswered items count as zero.
pub fn pcl_total(answers: &[Option<u8>]) -> Result<u32, Error> {
    if answers.len() > PCL_ITEMS.len() {
        return Err(Error::InvalidRecord(format!(
            "{} PCL-5 answers given, the checklist has {}",
            answers.len(),
            PCL_ITEMS.len()
        )));
    }
    answers.iter().enumerate().try_fold(0u32, |sum, (i, answer)| match answer {
        Some(v) if *v > PCL_MAX_ANSWER => Err(Error::InvalidRecord(format!(
            "PCL-5 item {} answered {v}, the scale ends at {PCL_MAX_ANSWER}",
            i + 1
        ))),
        Some(v) => Ok(sum + u32::from(*v)),
        None => Ok(sum),
    })
}

fn checkbox(text: &str, checked: bool) -> Step {
    Step::block(Block::CheckboxItem {
        text: text.to_string(),
        checked,
    })
}

const QUESTION_GAP: f32 = 6.0;

/// A question caption, set off from the choices above it.
fn question(text: &str) -> [Step; 2] {
    [
        Step::block(Block::Spacer(QUESTION_GAP)),
        Step::block(Block::Subheading {
            text: text.to_string(),
        }),
    ]
}

fn event_page(view: &QuestionnaireView) -> Vec<Step> {
    let event = &view.index_event;
    let mut steps = vec![
        Step::block(banner("Index Event")),
        Step::block(Block::Paragraph {
            text: EVENT_INSTRUCTIONS.to_string(),
        }),
        Step::block(Block::LabeledField {
            label: "Event".to_string(),
            value: FreeText::new(event.title.as_deref(), NOT_ANSWERED),
        }),
        Step::block(Block::LabeledField {
            label: "How long ago did it happen".to_string(),
            value: FreeText::new(event.elapsed.as_deref(), NOT_ANSWERED),
        }),
        Step::block(Block::LabeledField {
            label: "Completed".to_string(),
            value: FreeText {
                value: view
                    .baseline
                    .completed_on
                    .map(|d| d.format("%B %-d, %Y").to_string()),
                fallback: NOT_ANSWERED,
            },
        }),
    ];
    steps.extend(question(THREAT_QUESTION));
    steps.push(checkbox("Yes", event.involved_threat == Some(true)));
    steps.push(checkbox("No", event.involved_threat == Some(false)));
    steps.extend(question(EXPERIENCE_QUESTION));
    steps.extend(
        EXPERIENCE_CHOICES
            .iter()
            .map(|(choice, label)| checkbox(label, event.experience == Some(*choice))),
    );
    steps.extend(question(DEATH_QUESTION));
    steps.extend(
        DEATH_CHOICES
            .iter()
            .map(|(choice, label)| checkbox(label, event.death_cause == Some(*choice))),
    );
    steps
}

fn checklist_page(baseline: &Baseline) -> Result<Vec<Step>, Error> {
    let total = pcl_total(&baseline.pcl_answers)?;
    let mut headers = vec![PCL_PROMPT.to_string()];
    headers.extend(PCL_CHOICES.iter().map(|c| c.to_string()));
    let rows = PCL_ITEMS
        .iter()
        .enumerate()
        .map(|(i, item)| RatingRow {
            label: format!("{}. {item}", i + 1),
            marked: baseline
                .pcl_answers
                .get(i)
                .copied()
                .flatten()
                .map(usize::from),
        })
        .collect();
    Ok(vec![
        Step::block(banner("PTSD Checklist (PCL-5)")),
        Step::block(Block::AlternatingTable { headers, rows }),
        Step::block(Block::ScoreTotal {
            label: "Total score:".to_string(),
            value: format!("{total} / {PCL_MAX}"),
        }),
    ])
}

fn impact_page(baseline: &Baseline) -> Vec<Step> {
    vec![
        Step::block(banner("Impact Statement")),
        Step::block(Block::Paragraph {
            text: IMPACT_INSTRUCTIONS.to_string(),
        }),
        Step::block(Block::BulletList {
            items: IMPACT_PROMPTS.iter().map(|p| p.to_string()).collect(),
        }),
        Step::block(Block::NarrativePanel {
            text: FreeText::new(baseline.impact_statement.as_deref(), NOT_YET_WRITTEN),
        }),
    ]
}

impl Exporter for QuestionnaireView {
    fn subtitle(&self) -> &str {
        "Baseline Questionnaire"
    }

    fn compose(&self) -> Result<Vec<Step>, Error> {
        let mut steps = event_page(self);
        steps.push(Step::Page);
        steps.extend(checklist_page(&self.baseline)?);
        steps.push(Step::Page);
        steps.extend(impact_page(&self.baseline));
        Ok(steps)
    }
}
