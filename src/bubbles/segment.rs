//! Splits raw dialogue lines into per-speaker groups.

use std::collections::HashMap;

/// All dialogue of one speaker within a panel, in input order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeakerGroup {
    /// speaker key, `""` when a line had no `:` separator
    pub speaker: String,
    /// trimmed contents, possibly empty
    pub lines: Vec<String>,
}

impl SpeakerGroup {
    /// The text laid out inside the bubble.
    pub fn display_text(&self) -> String {
        self.lines.join(" ")
    }
}

/// Splits `line` at its first `:` into a trimmed `(speaker, content)` pair.
pub fn split_speaker(line: &str) -> (&str, &str) {
    match line.split_once(':') {
        Some((speaker, content)) => (speaker.trim(), content.trim()),
        None => ("", line.trim()),
    }
}

/// Groups dialogue by speaker in order of each speaker's first appearance.
pub fn group_by_speaker<S: AsRef<str>>(lines: &[S]) -> Vec<SpeakerGroup> {
    let mut groups: Vec<SpeakerGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for line in lines {
        let (speaker, content) = split_speaker(line.as_ref());
        let slot = match index.get(speaker) {
            Some(slot) => *slot,
            None => {
                index.insert(speaker.to_string(), groups.len());
                groups.push(SpeakerGroup {
                    speaker: speaker.to_string(),
                    lines: Vec::new(),
                });
                groups.len() - 1
            }
        };
        if let Some(group) = groups.get_mut(slot) {
            group.lines.push(content.to_string());
        }
    }
    groups
}
