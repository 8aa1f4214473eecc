use crate::model::EmotionEntry;

pub const NO_EMOTIONS: &str = "No emotions recorded.";

/// Entries worth showing: intensity above zero, strongest first. Ties keep
/// their recorded order (`sort_by` is stable).
pub fn displayed(entries: &[EmotionEntry]) -> Vec<&EmotionEntry> {
    let mut felt: Vec<&EmotionEntry> = entries.iter().filter(|e| e.intensity > 0).collect();
    felt.sort_by(|a, b| b.intensity.cmp(&a.intensity));
    felt
}

/// "Sad: 8/10<sep>Angry: 5/10", or [`NO_EMOTIONS`] when nothing was felt.
pub fn format_emotions(entries: &[EmotionEntry], separator: &str) -> String {
    let felt = displayed(entries);
    if felt.is_empty() {
        return NO_EMOTIONS.to_string();
    }
    felt.iter()
        .map(|e| format!("{}: {}/10", capitalize(e.label.trim()), e.intensity))
        .collect::<Vec<_>>()
        .join(separator)
}

pub fn has_emotions(entries: &[EmotionEntry]) -> bool {
    entries.iter().any(|e| e.intensity > 0)
}

/// First letter upper-cased, the rest lower-cased.
fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&str, u8)]) -> Vec<EmotionEntry> {
        pairs.iter().map(|&(l, i)| EmotionEntry::new(l, i)).collect()
    }

    #[test]
    fn drops_zero_intensity_and_sorts_descending() {
        let list = entries(&[("guilt", 3), ("fear", 0), ("anger", 9), ("shame", 5)]);
        assert_eq!(
            format_emotions(&list, ", "),
            "Anger: 9/10, Shame: 5/10, Guilt: 3/10"
        );
    }

    #[test]
    fn ties_keep_recorded_order() {
        let list = entries(&[("sad", 4), ("ANGRY", 7), ("afraid", 4), ("numb", 4)]);
        assert_eq!(
            format_emotions(&list, "\n"),
            "Angry: 7/10\nSad: 4/10\nAfraid: 4/10\nNumb: 4/10"
        );
    }

    #[test]
    fn all_zero_or_empty_uses_empty_state() {
        assert_eq!(format_emotions(&[], ", "), NO_EMOTIONS);
        let zeros = entries(&[("sad", 0), ("angry", 0)]);
        assert_eq!(format_emotions(&zeros, ", "), NO_EMOTIONS);
        assert!(!has_emotions(&zeros));
    }

    #[test]
    fn capitalize_lowercases_the_rest() {
        assert_eq!(capitalize("  ".trim()), "");
        assert_eq!(capitalize("hopeLESS"), "Hopeless");
        assert_eq!(capitalize("élan"), "Élan");
    }
}
