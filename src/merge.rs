//! Merge per-chunk extraction replies into one [`ExtractedInformation`].
//!
//! Each field is resolved independently by folding over the replies in the
//! order the chunks were processed, carrying `(best_value, best_confidence)`.
//! A candidate replaces the carried value only when it is informative (see
//! [`is_informative`]) and its confidence is *strictly* greater, so on a tie
//! the first-seen value wins. The initial best confidence is `0.0`, which
//! means a candidate with no reported confidence is never selected when more
//! than one reply is merged.

use crate::model::{is_informative, ExtractedInformation, ExtractionResult, Field, FieldSet, NOT_PROVIDED};
use std::collections::BTreeMap;
use tracing::debug;

/// Combine zero or more extraction replies. Never fails.
///
/// * no replies: every field is [`NOT_PROVIDED`] with confidence 0
/// * one reply: values pass through unchanged (absent fields become
///   [`NOT_PROVIDED`]) along with the reply's own confidences
/// * several replies: per-field highest-confidence informative value
pub fn merge(results: &[ExtractionResult]) -> ExtractedInformation {
    match results {
        [] => ExtractedInformation::not_provided(),
        [single] => pass_through(single),
        many => merge_many(many),
    }
}

fn pass_through(result: &ExtractionResult) -> ExtractedInformation {
    let fields = FieldSet::from_fn(|f| {
        result
            .value(f)
            .map_or_else(|| NOT_PROVIDED.to_string(), str::to_string)
    });
    let confidence = Field::ALL
        .into_iter()
        .map(|f| (f, result.confidence(f)))
        .collect();
    ExtractedInformation::new(fields, confidence)
}

fn merge_many(results: &[ExtractionResult]) -> ExtractedInformation {
    let mut confidence = BTreeMap::new();
    let fields = FieldSet::from_fn(|field| {
        let (best, best_confidence) = best_candidate(results, field);
        confidence.insert(field, best_confidence);
        match best {
            Some(v) => v.to_string(),
            None => NOT_PROVIDED.to_string(),
        }
    });
    debug!(
        "Merged {} extraction results: {} fields resolved",
        results.len(),
        fields.iter().filter(|(_, v)| *v != NOT_PROVIDED).count()
    );
    ExtractedInformation::new(fields, confidence)
}

/// Fold one field across all replies. Returns `(None, 0.0)` when no reply
/// offers an acceptable candidate.
fn best_candidate(results: &[ExtractionResult], field: Field) -> (Option<&str>, f64) {
    results
        .iter()
        .fold((None, 0.0), |(best, best_confidence), result| {
            match result.value(field) {
                Some(v) if is_informative(v) && result.confidence(field) > best_confidence => {
                    (Some(v), result.confidence(field))
                }
                _ => (best, best_confidence),
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(name: &str, confidence: f64) -> ExtractionResult {
        ExtractionResult::new()
            .with_value(Field::CompanyName, name)
            .with_confidence(Field::CompanyName, confidence)
    }

    #[test]
    fn empty_input_is_all_sentinel() {
        let info = merge(&[]);
        for (f, v) in info.fields.iter() {
            assert_eq!(v, NOT_PROVIDED, "field {f}");
            assert_eq!(info.confidence(f), 0.0);
        }
        assert_eq!(info.confidence_scores.len(), 11);
    }

    #[test]
    fn single_result_passes_through() {
        let r = ExtractionResult::new()
            .with_value(Field::CompanyName, "Acme Robotics")
            .with_value(Field::CurrentSales, "Information not provided in the document.")
            .with_value(Field::MarketSize, "")
            .with_confidence(Field::CompanyName, 0.2);
        let info = merge(std::slice::from_ref(&r));

        assert_eq!(info.get(Field::CompanyName), "Acme Robotics");
        assert_eq!(info.confidence(Field::CompanyName), 0.2);
        // Passed through verbatim, even though it is a "not provided" answer.
        assert_eq!(info.get(Field::CurrentSales), NOT_PROVIDED);
        // Empty strings are kept; only absent fields are coerced.
        assert_eq!(info.get(Field::MarketSize), "");
        assert_eq!(info.get(Field::MissingSkills), NOT_PROVIDED);
        assert_eq!(info.confidence(Field::MissingSkills), 0.0);
    }

    #[test]
    fn single_result_keeps_low_confidence_value() {
        // No confidence at all: value is still kept for a single reply.
        let r = ExtractionResult::new().with_value(Field::TechnologyType, "Diagnostic");
        let info = merge(&[r]);
        assert_eq!(info.get(Field::TechnologyType), "Diagnostic");
        assert_eq!(info.confidence(Field::TechnologyType), 0.0);
    }

    #[test]
    fn higher_later_confidence_wins() {
        let info = merge(&[reply("Alpha", 0.3), reply("Beta", 0.9)]);
        assert_eq!(info.get(Field::CompanyName), "Beta");
        assert_eq!(info.confidence(Field::CompanyName), 0.9);
    }

    #[test]
    fn higher_earlier_confidence_is_kept() {
        let info = merge(&[reply("Alpha", 0.8), reply("Beta", 0.4)]);
        assert_eq!(info.get(Field::CompanyName), "Alpha");
        assert_eq!(info.confidence(Field::CompanyName), 0.8);
    }

    #[test]
    fn ties_keep_first_seen() {
        let info = merge(&[reply("Alpha", 0.5), reply("Beta", 0.5), reply("Gamma", 0.5)]);
        assert_eq!(info.get(Field::CompanyName), "Alpha");
        assert_eq!(info.confidence(Field::CompanyName), 0.5);
    }

    #[test]
    fn not_provided_candidates_are_skipped() {
        let info = merge(&[
            reply("Company name not provided", 0.99),
            reply("Beta", 0.1),
        ]);
        assert_eq!(info.get(Field::CompanyName), "Beta");
        assert_eq!(info.confidence(Field::CompanyName), 0.1);
    }

    #[test]
    fn whitespace_candidate_is_non_empty() {
        let info = merge(&[reply("   ", 0.9), reply("Beta", 0.5)]);
        assert_eq!(info.get(Field::CompanyName), "   ");
        assert_eq!(info.confidence(Field::CompanyName), 0.9);
    }

    #[test]
    fn empty_candidate_is_skipped() {
        let info = merge(&[reply("", 0.9), reply("Beta", 0.5)]);
        assert_eq!(info.get(Field::CompanyName), "Beta");
        assert_eq!(info.confidence(Field::CompanyName), 0.5);
    }

    #[test]
    fn missing_confidence_never_wins_in_multi_merge() {
        let a = ExtractionResult::new().with_value(Field::CompanyName, "Alpha");
        let b = ExtractionResult::new().with_value(Field::CompanyName, "Beta");
        let info = merge(&[a, b]);
        assert_eq!(info.get(Field::CompanyName), NOT_PROVIDED);
        assert_eq!(info.confidence(Field::CompanyName), 0.0);
    }

    #[test]
    fn fields_are_resolved_independently() {
        let a = ExtractionResult::new()
            .with_value(Field::CompanyName, "Acme")
            .with_confidence(Field::CompanyName, 0.9)
            .with_value(Field::MarketSize, "$1B")
            .with_confidence(Field::MarketSize, 0.2);
        let b = ExtractionResult::new()
            .with_value(Field::CompanyName, "Acme Inc")
            .with_confidence(Field::CompanyName, 0.4)
            .with_value(Field::MarketSize, "$4.2B TAM")
            .with_confidence(Field::MarketSize, 0.7);
        let info = merge(&[a, b]);

        assert_eq!(info.get(Field::CompanyName), "Acme");
        assert_eq!(info.get(Field::MarketSize), "$4.2B TAM");
        assert_eq!(info.get(Field::YearsToExit), NOT_PROVIDED);
        assert_eq!(info.confidence(Field::YearsToExit), 0.0);
    }

    #[test]
    fn confidence_is_not_clamped() {
        let info = merge(&[reply("Alpha", 0.5), reply("Beta", 7.0)]);
        assert_eq!(info.get(Field::CompanyName), "Beta");
        assert_eq!(info.confidence(Field::CompanyName), 7.0);
    }
}
