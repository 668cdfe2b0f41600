use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Number of labels in the fixed toxicity vocabulary.
pub const NUM_LABELS: usize = 6;

/// Decision cutoff used when none is configured. Matches the convention
/// of the underlying multi-label sigmoid head.
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// The fixed toxicity label vocabulary.
///
/// The discriminant doubles as the index into the model's output head,
/// so `Label::ALL` is the canonical output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Label {
    Toxic = 0,
    SevereToxic = 1,
    Obscene = 2,
    Threat = 3,
    Insult = 4,
    IdentityHate = 5,
}

impl Label {
    /// All labels in canonical order.
    pub const ALL: [Label; NUM_LABELS] = [
        Label::Toxic,
        Label::SevereToxic,
        Label::Obscene,
        Label::Threat,
        Label::Insult,
        Label::IdentityHate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Toxic => "toxic",
            Label::SevereToxic => "severe_toxic",
            Label::Obscene => "obscene",
            Label::Threat => "threat",
            Label::Insult => "insult",
            Label::IdentityHate => "identity_hate",
        }
    }

    /// Parses a label from its wire form. Strings outside the fixed
    /// vocabulary yield `None`.
    pub fn parse(s: &str) -> Option<Label> {
        match s {
            "toxic" => Some(Label::Toxic),
            "severe_toxic" => Some(Label::SevereToxic),
            "obscene" => Some(Label::Obscene),
            "threat" => Some(Label::Threat),
            "insult" => Some(Label::Insult),
            "identity_hate" => Some(Label::IdentityHate),
            _ => None,
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One sigmoid probability per label, always all six.
///
/// These are independent multi-label scores, not a distribution; they
/// need not sum to 1. Serializes as a JSON object keyed by label name,
/// in canonical order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelScores([f32; NUM_LABELS]);

impl LabelScores {
    pub fn new(scores: [f32; NUM_LABELS]) -> Self {
        Self(scores)
    }

    pub fn get(&self, label: Label) -> f32 {
        self.0[label.index()]
    }

    /// Iterates label/score pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Label, f32)> + '_ {
        Label::ALL.iter().map(move |&label| (label, self.get(label)))
    }
}

impl Serialize for LabelScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(NUM_LABELS))?;
        for (label, score) in self.iter() {
            map.serialize_entry(label.as_str(), &score)?;
        }
        map.end()
    }
}

/// Returns the labels whose score strictly exceeds `threshold`, in
/// canonical order. An empty result is a valid outcome, not an error.
pub fn labels_over_threshold(scores: &LabelScores, threshold: f32) -> Vec<Label> {
    Label::ALL
        .iter()
        .copied()
        .filter(|&label| scores.get(label) > threshold)
        .collect()
}
