//! Boundary matcher confidence scoring (SPEC_FULL §B.6, grounded on
//! `cross_lang/boundary_analyzer.py` in `original_source/`). Beyond the
//! type-compatibility lattice, a candidate cross-service edge's confidence
//! is scored from field-name similarity and endpoint/method agreement —
//! used by the Reasoning Pipeline when turning mined `BoundarySpec`s into
//! scored `FLOWS_TO` edges.

use crate::features::boundary_types::domain::BoundarySpec;
use crate::shared::models::Confidence;

pub struct BoundaryMatcher;

impl BoundaryMatcher {
    /// Score how well a caller-side request shape matches a callee-side
    /// `BoundarySpec`, in `[0, 1]`. Combines field-name overlap between the
    /// caller's declared fields and the spec's request schema with a flat
    /// bonus for an exact endpoint/method match.
    pub fn score_match(spec: &BoundarySpec, caller_fields: &[String], caller_endpoint: Option<&str>) -> f64 {
        let field_score = Self::field_overlap(caller_fields, spec.request_schema.keys());
        let endpoint_score = match caller_endpoint {
            Some(ep) if ep == spec.endpoint_or_method => 1.0,
            Some(ep) if Self::similar(ep, &spec.endpoint_or_method) => 0.5,
            _ => 0.0,
        };

        (0.6 * field_score + 0.4 * endpoint_score).clamp(0.0, 1.0)
    }

    pub fn confidence_bucket(score: f64) -> Confidence {
        if score >= 0.7 {
            Confidence::High
        } else if score >= 0.4 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    fn field_overlap<'a>(caller_fields: &[String], spec_fields: impl Iterator<Item = &'a String>) -> f64 {
        let spec_fields: Vec<&str> = spec_fields.map(|s| s.as_str()).collect();
        if spec_fields.is_empty() || caller_fields.is_empty() {
            return 0.0;
        }
        let matched = caller_fields
            .iter()
            .filter(|f| spec_fields.iter().any(|s| s.eq_ignore_ascii_case(f)))
            .count();
        matched as f64 / spec_fields.len().max(caller_fields.len()) as f64
    }

    /// Loose endpoint similarity: same after stripping path parameters and
    /// casing, e.g. `/users/{id}` ~ `/users/:id`.
    fn similar(a: &str, b: &str) -> bool {
        let normalize = |s: &str| -> String {
            s.to_ascii_lowercase()
                .split('/')
                .map(|seg| if seg.starts_with('{') || seg.starts_with(':') { "*" } else { seg })
                .collect::<Vec<_>>()
                .join("/")
        };
        normalize(a) == normalize(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::boundary_types::domain::ProtocolType;

    fn spec_with_fields(fields: &[&str]) -> BoundarySpec {
        let mut spec = BoundarySpec::new(ProtocolType::RestApi, "billing", "/users/{id}");
        for f in fields {
            spec.request_schema.insert(f.to_string(), "string".to_string());
        }
        spec
    }

    #[test]
    fn exact_field_and_endpoint_match_scores_high() {
        let spec = spec_with_fields(&["user_id", "amount"]);
        let caller_fields = vec!["user_id".to_string(), "amount".to_string()];
        let score = BoundaryMatcher::score_match(&spec, &caller_fields, Some("/users/{id}"));
        assert!(score > 0.9);
        assert_eq!(BoundaryMatcher::confidence_bucket(score), Confidence::High);
    }

    #[test]
    fn no_field_overlap_scores_low() {
        let spec = spec_with_fields(&["user_id"]);
        let caller_fields = vec!["unrelated".to_string()];
        let score = BoundaryMatcher::score_match(&spec, &caller_fields, None);
        assert_eq!(BoundaryMatcher::confidence_bucket(score), Confidence::Low);
    }

    #[test]
    fn parameterized_endpoint_matches_loosely() {
        let spec = spec_with_fields(&["user_id"]);
        let caller_fields = vec!["user_id".to_string()];
        let score = BoundaryMatcher::score_match(&spec, &caller_fields, Some("/users/:id"));
        assert!(score > 0.5);
    }
}
