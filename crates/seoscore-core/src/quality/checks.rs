//! The default gate set applied to AI-generated analysis payloads.
//!
//! Every check is a pure function of the payload (and optional context) that
//! scores 0–1 from presence and ratio counts over known fields.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{json, Map, Value};

use crate::errors::ScoringResult;
use crate::quality::gate::{CheckError, CheckOutcome, QualityCheck, QualityGate};

pub const DATA_COMPLETENESS: &str = "data_completeness";
pub const EVIDENCE_QUALITY: &str = "evidence_quality";
pub const ACTIONABILITY: &str = "actionability";
pub const BUSINESS_RELEVANCE: &str = "business_relevance";
pub const PRIORITIZATION: &str = "prioritization";
pub const INTERNAL_CONSISTENCY: &str = "internal_consistency";
pub const AI_VISIBILITY: &str = "ai_visibility";
pub const TECHNICAL_DEPTH: &str = "technical_depth";

pub const DEFAULT_GATE_NAMES: [&str; 8] = [
    DATA_COMPLETENESS,
    EVIDENCE_QUALITY,
    ACTIONABILITY,
    BUSINESS_RELEVANCE,
    PRIORITIZATION,
    INTERNAL_CONSISTENCY,
    AI_VISIBILITY,
    TECHNICAL_DEPTH,
];

pub const EXPECTED_SECTIONS: [&str; 6] = [
    "executive_summary",
    "domain_classification",
    "findings",
    "recommendations",
    "keyword_analysis",
    "competitor_analysis",
];
pub const EVIDENCE_FIELDS: [&str; 4] = ["evidence", "data_source", "metrics", "sources"];
pub const IMPACT_FIELDS: [&str; 5] = [
    "expected_impact",
    "business_impact",
    "estimated_traffic",
    "estimated_value",
    "revenue_impact",
];
pub const PRIORITY_LABELS: [&str; 4] = ["critical", "high", "medium", "low"];
pub const AI_VISIBILITY_FIELDS: [&str; 5] = [
    "platforms_checked",
    "brand_mentions",
    "citation_rate",
    "competitor_comparison",
    "recommendations",
];
pub const TECHNICAL_FIELDS: [&str; 6] = [
    "core_web_vitals",
    "crawlability",
    "indexation",
    "schema_markup",
    "mobile_usability",
    "site_speed",
];

static ACTION_VERB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(create|update|add|optimize|remove|fix|build|publish|improve|rewrite|consolidate|target|implement|expand|redirect|refresh|acquire|launch|audit|migrate|compress|write)\b",
    )
    .unwrap()
});

// ---------------------------------------------------------------------------
// Payload helpers
// ---------------------------------------------------------------------------

fn as_object(payload: &Value) -> Result<&Map<String, Value>, CheckError> {
    payload
        .as_object()
        .ok_or_else(|| CheckError::Malformed("analysis payload must be a JSON object".to_string()))
}

/// Present and non-empty: null, blank strings, and empty containers don't count.
pub fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(_) => true,
    }
}

fn array_section<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a [Value], CheckError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err(CheckError::Malformed(format!("{key} must be an array"))),
    }
}

fn object_section<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, CheckError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(CheckError::Malformed(format!("{key} must be an object"))),
    }
}

fn ratio(hits: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

fn field_coverage(section: &Map<String, Value>, fields: &[&str]) -> (f64, Vec<String>) {
    let missing: Vec<String> = fields
        .iter()
        .filter(|f| !is_present(section.get(**f)))
        .map(|f| f.to_string())
        .collect();
    let score = ratio(fields.len() - missing.len(), fields.len());
    (score, missing)
}

/// `action`, else `title`, else the recommendation itself when it is a string.
fn recommendation_text(rec: &Value) -> Option<&str> {
    match rec {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => map
            .get("action")
            .and_then(Value::as_str)
            .or_else(|| map.get("title").and_then(Value::as_str)),
        _ => None,
    }
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn normalized_priority(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let label = s.trim().to_lowercase();
            PRIORITY_LABELS.contains(&label.as_str()).then_some(label)
        }
        Value::Number(n) => n
            .as_i64()
            .filter(|p| (1..=5).contains(p))
            .map(|p| p.to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

pub struct DataCompletenessCheck;

impl QualityCheck for DataCompletenessCheck {
    fn evaluate(&self, payload: &Value, context: &Value) -> Result<CheckOutcome, CheckError> {
        let obj = as_object(payload)?;
        let expected: Vec<String> = match context.get("required_sections") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => EXPECTED_SECTIONS.iter().map(|s| s.to_string()).collect(),
        };
        if expected.is_empty() {
            return Ok(CheckOutcome::not_applicable("no sections required"));
        }

        let missing: Vec<&String> = expected
            .iter()
            .filter(|s| !is_present(obj.get(s.as_str())))
            .collect();
        let present = expected.len() - missing.len();
        Ok(CheckOutcome::scored(
            ratio(present, expected.len()),
            format!("{present}/{} expected sections present", expected.len()),
        )
        .with_details(json!({ "missing_sections": missing })))
    }
}

pub struct EvidenceQualityCheck;

impl QualityCheck for EvidenceQualityCheck {
    fn evaluate(&self, payload: &Value, _context: &Value) -> Result<CheckOutcome, CheckError> {
        let findings = array_section(as_object(payload)?, "findings")?;
        if findings.is_empty() {
            return Ok(CheckOutcome::scored(0.0, "no findings to support"));
        }
        let cited = findings
            .iter()
            .filter(|finding| {
                finding
                    .as_object()
                    .is_some_and(|f| EVIDENCE_FIELDS.iter().any(|k| is_present(f.get(*k))))
            })
            .count();
        Ok(CheckOutcome::scored(
            ratio(cited, findings.len()),
            format!("{cited}/{} findings cite evidence", findings.len()),
        )
        .with_details(json!({ "findings": findings.len(), "with_evidence": cited })))
    }
}

pub struct ActionabilityCheck;

impl QualityCheck for ActionabilityCheck {
    fn evaluate(&self, payload: &Value, _context: &Value) -> Result<CheckOutcome, CheckError> {
        let recommendations = array_section(as_object(payload)?, "recommendations")?;
        if recommendations.is_empty() {
            return Ok(CheckOutcome::scored(0.0, "no recommendations"));
        }
        let actionable = recommendations
            .iter()
            .filter(|rec| recommendation_text(rec).is_some_and(|t| ACTION_VERB_RE.is_match(t)))
            .count();
        Ok(CheckOutcome::scored(
            ratio(actionable, recommendations.len()),
            format!(
                "{actionable}/{} recommendations name a concrete action verb",
                recommendations.len()
            ),
        )
        .with_details(json!({ "recommendations": recommendations.len(), "actionable": actionable })))
    }
}

pub struct BusinessRelevanceCheck;

impl QualityCheck for BusinessRelevanceCheck {
    fn evaluate(&self, payload: &Value, _context: &Value) -> Result<CheckOutcome, CheckError> {
        let recommendations = array_section(as_object(payload)?, "recommendations")?;
        if recommendations.is_empty() {
            return Ok(CheckOutcome::not_applicable("no recommendations to assess"));
        }
        let with_impact = recommendations
            .iter()
            .filter(|rec| {
                rec.as_object()
                    .is_some_and(|r| IMPACT_FIELDS.iter().any(|k| is_present(r.get(*k))))
            })
            .count();
        Ok(CheckOutcome::scored(
            ratio(with_impact, recommendations.len()),
            format!(
                "{with_impact}/{} recommendations estimate business impact",
                recommendations.len()
            ),
        ))
    }
}

pub struct PrioritizationCheck;

impl QualityCheck for PrioritizationCheck {
    fn evaluate(&self, payload: &Value, _context: &Value) -> Result<CheckOutcome, CheckError> {
        let recommendations = array_section(as_object(payload)?, "recommendations")?;
        if recommendations.is_empty() {
            return Ok(CheckOutcome::scored(0.0, "no recommendations to prioritize"));
        }
        let priorities: Vec<String> = recommendations
            .iter()
            .filter_map(|rec| normalized_priority(rec.as_object().and_then(|r| r.get("priority"))))
            .collect();

        let mut score = ratio(priorities.len(), recommendations.len());
        let distinct: HashSet<&String> = priorities.iter().collect();
        let undifferentiated = priorities.len() > 1 && distinct.len() == 1;
        if undifferentiated {
            score *= 0.5;
        }
        let message = if undifferentiated {
            format!(
                "{}/{} recommendations prioritized, all at the same level",
                priorities.len(),
                recommendations.len()
            )
        } else {
            format!(
                "{}/{} recommendations carry a valid priority",
                priorities.len(),
                recommendations.len()
            )
        };
        Ok(CheckOutcome::scored(score, message)
            .with_details(json!({ "distinct_priorities": distinct.len() })))
    }
}

pub struct InternalConsistencyCheck;

impl QualityCheck for InternalConsistencyCheck {
    fn evaluate(&self, payload: &Value, _context: &Value) -> Result<CheckOutcome, CheckError> {
        let obj = as_object(payload)?;
        let findings = array_section(obj, "findings")?;
        let recommendations = array_section(obj, "recommendations")?;

        let finding_ids: HashSet<String> = findings
            .iter()
            .filter_map(|f| f.get("id").and_then(id_string))
            .collect();

        let mut total = 0usize;
        let mut issues: Vec<String> = Vec::new();

        for (index, rec) in recommendations.iter().enumerate() {
            let Some(related) = rec.get("related_findings") else {
                continue;
            };
            total += 1;
            let refs: Vec<&Value> = match related {
                Value::Array(items) => items.iter().collect(),
                other => vec![other],
            };
            let dangling: Vec<String> = refs
                .into_iter()
                .filter_map(id_string)
                .filter(|id| !finding_ids.contains(id))
                .collect();
            if !dangling.is_empty() {
                issues.push(format!(
                    "recommendation {index} references unknown findings: {}",
                    dangling.join(", ")
                ));
            }
        }

        if let Some(summary) = object_section(obj, "executive_summary")? {
            for (key, actual) in [
                ("total_findings", findings.len()),
                ("total_recommendations", recommendations.len()),
            ] {
                let Some(claimed) = summary.get(key).and_then(Value::as_u64) else {
                    continue;
                };
                total += 1;
                if claimed != actual as u64 {
                    issues.push(format!("executive_summary.{key} is {claimed}, actual {actual}"));
                }
            }
        }

        let mut seen_titles = HashSet::new();
        for rec in recommendations {
            let Some(title) = rec.get("title").and_then(Value::as_str) else {
                continue;
            };
            total += 1;
            let normalized = normalize_title(title);
            if !seen_titles.insert(normalized) {
                issues.push(format!("duplicate recommendation: {title:?}"));
            }
        }

        if total == 0 {
            return Ok(CheckOutcome::scored(1.0, "nothing to cross-check"));
        }
        let passed = total - issues.len();
        Ok(CheckOutcome::scored(
            ratio(passed, total),
            format!("{passed}/{total} consistency checks passed"),
        )
        .with_details(json!({ "issues": issues })))
    }
}

pub struct AiVisibilityCheck;

impl QualityCheck for AiVisibilityCheck {
    fn evaluate(&self, payload: &Value, _context: &Value) -> Result<CheckOutcome, CheckError> {
        let Some(section) = object_section(as_object(payload)?, "ai_visibility")? else {
            return Ok(CheckOutcome::not_applicable("no AI visibility section"));
        };
        let (score, missing) = field_coverage(section, &AI_VISIBILITY_FIELDS);
        Ok(CheckOutcome::scored(
            score,
            format!(
                "{}/{} AI visibility fields covered",
                AI_VISIBILITY_FIELDS.len() - missing.len(),
                AI_VISIBILITY_FIELDS.len()
            ),
        )
        .with_details(json!({ "missing_fields": missing })))
    }
}

pub struct TechnicalDepthCheck;

impl QualityCheck for TechnicalDepthCheck {
    fn evaluate(&self, payload: &Value, _context: &Value) -> Result<CheckOutcome, CheckError> {
        let Some(section) = object_section(as_object(payload)?, "technical_audit")? else {
            return Ok(CheckOutcome::scored(0.0, "no technical audit"));
        };
        let (score, missing) = field_coverage(section, &TECHNICAL_FIELDS);
        Ok(CheckOutcome::scored(
            score,
            format!(
                "{}/{} technical areas covered",
                TECHNICAL_FIELDS.len() - missing.len(),
                TECHNICAL_FIELDS.len()
            ),
        )
        .with_details(json!({ "missing_fields": missing })))
    }
}

/// The eight default gates, in evaluation order.
pub fn default_gates() -> ScoringResult<Vec<QualityGate>> {
    Ok(vec![
        QualityGate::new(
            DATA_COMPLETENESS,
            "Expected report sections are present",
            0.8,
            1.5,
            true,
            DataCompletenessCheck,
        )?,
        QualityGate::new(
            EVIDENCE_QUALITY,
            "Findings cite supporting data",
            0.7,
            1.5,
            true,
            EvidenceQualityCheck,
        )?,
        QualityGate::new(
            ACTIONABILITY,
            "Recommendations name a concrete action",
            0.7,
            1.2,
            true,
            ActionabilityCheck,
        )?,
        QualityGate::new(
            BUSINESS_RELEVANCE,
            "Recommendations estimate business impact",
            0.6,
            1.0,
            false,
            BusinessRelevanceCheck,
        )?,
        QualityGate::new(
            PRIORITIZATION,
            "Recommendations are prioritized and differentiated",
            0.8,
            1.0,
            true,
            PrioritizationCheck,
        )?,
        QualityGate::new(
            INTERNAL_CONSISTENCY,
            "Cross-references and counts agree",
            0.8,
            1.3,
            true,
            InternalConsistencyCheck,
        )?,
        QualityGate::new(
            AI_VISIBILITY,
            "AI assistant visibility is covered",
            0.5,
            0.8,
            false,
            AiVisibilityCheck,
        )?,
        QualityGate::new(
            TECHNICAL_DEPTH,
            "Technical audit covers the core areas",
            0.6,
            1.0,
            false,
            TechnicalDepthCheck,
        )?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(check: &dyn QualityCheck, payload: &Value) -> CheckOutcome {
        check.evaluate(payload, &Value::Null).unwrap()
    }

    #[test]
    fn test_default_gate_table() {
        let gates = default_gates().unwrap();
        let names: Vec<&str> = gates.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, DEFAULT_GATE_NAMES);
        let required: Vec<&str> = gates
            .iter()
            .filter(|g| g.required)
            .map(|g| g.name.as_str())
            .collect();
        assert_eq!(
            required,
            vec![
                DATA_COMPLETENESS,
                EVIDENCE_QUALITY,
                ACTIONABILITY,
                PRIORITIZATION,
                INTERNAL_CONSISTENCY
            ]
        );
    }

    #[test]
    fn test_data_completeness_ratio_and_context_override() {
        let payload = json!({
            "executive_summary": "Traffic is flat.",
            "findings": [{"title": "x"}],
            "recommendations": [],
            "keyword_analysis": {"total": 10},
            "competitor_analysis": null,
        });
        let outcome = run(&DataCompletenessCheck, &payload);
        assert!((outcome.score.unwrap() - 3.0 / 6.0).abs() < 1e-12);
        assert_eq!(outcome.details["missing_sections"].as_array().unwrap().len(), 3);

        let context = json!({"required_sections": ["findings", "keyword_analysis"]});
        let outcome = DataCompletenessCheck.evaluate(&payload, &context).unwrap();
        assert_eq!(outcome.score, Some(1.0));
    }

    #[test]
    fn test_evidence_quality() {
        let payload = json!({"findings": [
            {"title": "a", "evidence": "GSC export shows -40%"},
            {"title": "b", "metrics": {"traffic": 120}},
            {"title": "c", "evidence": ""},
            "bare string finding",
        ]});
        assert_eq!(run(&EvidenceQualityCheck, &payload).score, Some(0.5));
        assert_eq!(run(&EvidenceQualityCheck, &json!({})).score, Some(0.0));
    }

    #[test]
    fn test_actionability_whole_word_verbs() {
        let payload = json!({"recommendations": [
            {"action": "Optimize title tags on category pages"},
            {"title": "Consolidate thin blog posts"},
            "Write a pricing comparison page",
            {"action": "Consider the situation"},
            {"action": "Updated pages are good"},
        ]});
        assert_eq!(run(&ActionabilityCheck, &payload).score, Some(0.6));
    }

    #[test]
    fn test_actionability_counts_verbs_anywhere() {
        let payload = json!({"recommendations": [
            {"action": "For the pricing cluster, rewrite meta descriptions"},
            {"action": "Nothing to do here"},
        ]});
        let outcome = run(&ActionabilityCheck, &payload);
        assert_eq!(outcome.score, Some(0.5));
        assert_eq!(outcome.message, "1/2 recommendations name a concrete action verb");
    }

    #[test]
    fn test_business_relevance_skips_without_recommendations() {
        assert_eq!(run(&BusinessRelevanceCheck, &json!({})).score, None);
        let payload = json!({"recommendations": [
            {"title": "a", "estimated_traffic": 1200},
            {"title": "b"},
        ]});
        assert_eq!(run(&BusinessRelevanceCheck, &payload).score, Some(0.5));
    }

    #[test]
    fn test_prioritization_halves_undifferentiated() {
        let varied = json!({"recommendations": [
            {"priority": "high"}, {"priority": 2}, {"priority": "urgent"}, {"priority": "LOW"},
        ]});
        assert_eq!(run(&PrioritizationCheck, &varied).score, Some(0.75));

        let flat = json!({"recommendations": [{"priority": "high"}, {"priority": "High"}]});
        assert_eq!(run(&PrioritizationCheck, &flat).score, Some(0.5));

        let single = json!({"recommendations": [{"priority": "high"}]});
        assert_eq!(run(&PrioritizationCheck, &single).score, Some(1.0));
    }

    #[test]
    fn test_internal_consistency() {
        let payload = json!({
            "executive_summary": {"total_findings": 2, "total_recommendations": 5},
            "findings": [{"id": "f1"}, {"id": 2}],
            "recommendations": [
                {"title": "Fix redirects", "related_findings": ["f1", 2]},
                {"title": "fix  Redirects", "related_findings": ["f9"]},
            ],
        });
        let outcome = run(&InternalConsistencyCheck, &payload);
        // 2 reference checks, 2 summary counts, 2 titles: 3 issues.
        assert_eq!(outcome.score, Some(0.5));
        assert_eq!(outcome.details["issues"].as_array().unwrap().len(), 3);

        assert_eq!(run(&InternalConsistencyCheck, &json!({})).score, Some(1.0));
    }

    #[test]
    fn test_section_coverage_checks() {
        assert_eq!(run(&AiVisibilityCheck, &json!({})).score, None);
        let payload = json!({
            "ai_visibility": {"platforms_checked": ["chatgpt"], "brand_mentions": 4},
            "technical_audit": {"core_web_vitals": {"lcp": 2.1}, "crawlability": "ok", "indexation": ""},
        });
        assert_eq!(run(&AiVisibilityCheck, &payload).score, Some(0.4));
        let technical = run(&TechnicalDepthCheck, &payload).score.unwrap();
        assert!((technical - 2.0 / 6.0).abs() < 1e-12);
        assert_eq!(run(&TechnicalDepthCheck, &json!({})).score, Some(0.0));
    }

    #[test]
    fn test_non_object_payload_is_malformed() {
        let payload = json!(["not", "an", "object"]);
        for gate in default_gates().unwrap() {
            let err = gate.check().evaluate(&payload, &Value::Null).unwrap_err();
            assert!(matches!(err, CheckError::Malformed(_)), "{}", gate.name);
        }
    }
}
