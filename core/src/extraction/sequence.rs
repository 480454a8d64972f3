//! Sequence label inference from series descriptions
//!
//! The classifier is an ordered chain of rules. Each rule has a pattern, an
//! ordered list of refinements tried when the pattern matches, and a
//! fallback label. The first matching rule decides the label; rule order
//! encodes which sequence families take precedence (T1 before SPGR, T2
//! before FLAIR, ...). All patterns are unanchored substring searches over
//! lower-cased text.

use super::description::rm_extra_info;
use crate::error::Result;
use crate::types::fields::SERIES_DESCRIPTION;
use crate::types::{SeqLabel, SeriesRecord};
use regex::Regex;
use std::sync::OnceLock;

// Pattern sets shared between rules
const SPGR: &str = "spgr|mprage";
const SWI: &str = "swi|gre|susc|mag|pha|sw";
const EADC: &str = "exp|eadc";

/// Static description of one rule: (pattern, refinements, fallback)
type RuleSpec = (&'static str, &'static [(&'static str, SeqLabel)], SeqLabel);

const RULES: &[RuleSpec] = &[
    ("t1", &[(SPGR, SeqLabel::Spgr)], SeqLabel::T1),
    (SPGR, &[], SeqLabel::Spgr),
    (
        "t2",
        &[("flair", SeqLabel::Flair), (SWI, SeqLabel::Swi)],
        SeqLabel::T2,
    ),
    ("flair", &[], SeqLabel::Flair),
    (SWI, &[], SeqLabel::Swi),
    ("adc|apparent", &[(EADC, SeqLabel::Other)], SeqLabel::Adc),
    ("diff|dwi|trace", &[(EADC, SeqLabel::Other)], SeqLabel::Dwi),
    ("mra|angio|cow|tof|mip", &[], SeqLabel::Mra),
    ("loc|scout", &[], SeqLabel::Loc),
];

/// A compiled rule of the chain
#[derive(Debug)]
pub struct SequenceRule {
    pattern: Regex,
    refinements: Vec<(Regex, SeqLabel)>,
    label: SeqLabel,
}

impl SequenceRule {
    fn compile(spec: &RuleSpec) -> Self {
        let (pattern, refinements, label) = spec;
        Self {
            pattern: Regex::new(pattern).expect("Failed to compile regex"),
            refinements: refinements
                .iter()
                .map(|(p, l)| (Regex::new(p).expect("Failed to compile regex"), *l))
                .collect(),
            label: *label,
        }
    }

    /// Applies the rule: `None` if the pattern does not match, otherwise the
    /// first matching refinement's label or the fallback label
    pub fn apply(&self, text: &str) -> Option<SeqLabel> {
        if !self.pattern.is_match(text) {
            return None;
        }
        let refined = self
            .refinements
            .iter()
            .find(|(re, _)| re.is_match(text))
            .map(|(_, label)| *label);
        Some(refined.unwrap_or(self.label))
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn label(&self) -> SeqLabel {
        self.label
    }
}

/// The compiled rule chain, in evaluation order
pub fn sequence_rules() -> &'static [SequenceRule] {
    static RULE_CHAIN: OnceLock<Vec<SequenceRule>> = OnceLock::new();
    RULE_CHAIN.get_or_init(|| RULES.iter().map(SequenceRule::compile).collect())
}

/// First-match-wins evaluation of a rule chain
///
/// Returns `Unknown` when no rule matches.
pub fn evaluate_rules(rules: &[SequenceRule], text: &str) -> SeqLabel {
    rules
        .iter()
        .find_map(|rule| rule.apply(text))
        .unwrap_or(SeqLabel::Unknown)
}

/// Classifies already lower-cased, cleaned description text
///
/// # Example
///
/// ```
/// use mrseq_core::{extraction::find_seq, SeqLabel};
///
/// assert_eq!(find_seq("sag t1 mprage"), SeqLabel::Spgr);
/// assert_eq!(find_seq("ax t2 flair"), SeqLabel::Flair);
/// assert_eq!(find_seq("dwi eadc"), SeqLabel::Other);
/// ```
pub fn find_seq(text: &str) -> SeqLabel {
    evaluate_rules(sequence_rules(), text)
}

/// Sequence label of a raw series description
///
/// Lower-cases the text and strips bracketed annotations before
/// classification.
pub fn extract_label(description: &str) -> SeqLabel {
    find_seq(&rm_extra_info(&description.to_lowercase()))
}

/// Sequence label of a record's SeriesDescription
///
/// # Errors
///
/// Returns [`MissingText`](crate::MrseqError::MissingText) if the
/// SeriesDescription is not a string.
pub fn extract_record_label(record: &SeriesRecord) -> Result<SeqLabel> {
    Ok(extract_label(record.require_text(SERIES_DESCRIPTION)?))
}
