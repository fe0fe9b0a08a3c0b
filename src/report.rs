//! Report generation: research → content → formatting → originality score.
//!
//! Each stage is a single call on the injected [`ModelClient`]; the only
//! local logic is the cleanup of the formatted text and the parsing of the
//! originality score.

use crate::error::{ModelError, PdfTextError};
use crate::pipeline::llm::ModelClient;
use crate::pipeline::postprocess::clean_model_output;
use crate::prompts::{content_instructions, FORMAT_INSTRUCTIONS, PLAGIARISM_RUBRIC, RESEARCH_INSTRUCTIONS};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Maximum points per rubric criterion.
pub const CRITERION_MAX: u8 = 20;
/// Maximum total score.
pub const TOTAL_MAX: u8 = 100;

/// One rubric criterion and its points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub name: String,
    /// 0–20.
    pub score: u8,
}

/// Interpretation band of a total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OriginalityBand {
    /// 90–100
    HighlyOriginal,
    /// 70–89
    MostlyOriginal,
    /// 50–69
    ModeratelyOriginal,
    /// 30–49
    NeedsImprovement,
    /// 0–29
    SignificantConcerns,
}

impl OriginalityBand {
    pub fn from_total(total: u8) -> Self {
        match total {
            90.. => OriginalityBand::HighlyOriginal,
            70..=89 => OriginalityBand::MostlyOriginal,
            50..=69 => OriginalityBand::ModeratelyOriginal,
            30..=49 => OriginalityBand::NeedsImprovement,
            _ => OriginalityBand::SignificantConcerns,
        }
    }
}

impl fmt::Display for OriginalityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OriginalityBand::HighlyOriginal => "Highly original",
            OriginalityBand::MostlyOriginal => "Mostly original",
            OriginalityBand::ModeratelyOriginal => "Moderately original",
            OriginalityBand::NeedsImprovement => "Needs improvement",
            OriginalityBand::SignificantConcerns => "Significant concerns",
        })
    }
}

/// Parsed originality score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlagiarismScore {
    /// 0–100, where 100 is completely original.
    pub total: u8,
    pub criteria: Vec<CriterionScore>,
    pub band: OriginalityBand,
    pub analysis: String,
}

/// Output of [`generate_report`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Formatted markdown, ready for the exporters.
    pub content: String,
    pub score: PlagiarismScore,
}

/// Run the four-stage report chain over `text`.
///
/// Any failed model call aborts the chain; there is no meaningful partial
/// report.
pub async fn generate_report(
    client: &dyn ModelClient,
    text: &str,
    brand_context: &str,
) -> Result<Report, PdfTextError> {
    let stage = |name: &'static str| move |source: ModelError| PdfTextError::Model {
        stage: name.to_string(),
        source,
    };

    info!("Report: extracting content");
    let research = client
        .summarize(text, RESEARCH_INSTRUCTIONS)
        .await
        .map_err(stage("research"))?;

    info!("Report: structuring content");
    let content = client
        .summarize(&research, &content_instructions(brand_context))
        .await
        .map_err(stage("content creation"))?;

    info!("Report: formatting");
    let formatted = client
        .summarize(&content, FORMAT_INSTRUCTIONS)
        .await
        .map_err(stage("formatting"))?;
    let formatted = clean_model_output(&formatted);

    info!("Report: scoring originality");
    let score = client
        .score(&formatted, PLAGIARISM_RUBRIC)
        .await
        .map_err(stage("originality scoring"))?;
    info!("Originality score: {}/100 ({})", score.total, score.band);

    Ok(Report {
        content: formatted,
        score,
    })
}

// ── Score parsing ────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RawScore {
    #[serde(default)]
    criteria: Vec<RawCriterion>,
    #[serde(default)]
    total: Option<f64>,
    #[serde(default)]
    analysis: Option<String>,
}

#[derive(Deserialize)]
struct RawCriterion {
    name: String,
    score: f64,
}

static RE_JSON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*(\{.*\})\s*```").unwrap());
static RE_OUT_OF_100: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,3})\s*/\s*100").unwrap());
static RE_TOTAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:total|score)\s*[:=]\s*(\d{1,3})").unwrap());

/// Parse a model's originality answer.
///
/// Accepts a JSON object (bare, embedded in prose, or inside a ```json
/// fence). Criteria are clamped to 20 points and the total to 100; a missing
/// total is the sum of the criteria. Without JSON, the first `NN/100` or
/// `Total: NN` figure is used and the whole answer becomes the analysis.
pub fn parse_score(reply: &str) -> Result<PlagiarismScore, ModelError> {
    if let Some(raw) = find_json(reply) {
        let criteria: Vec<CriterionScore> = raw
            .criteria
            .into_iter()
            .map(|c| CriterionScore {
                name: c.name,
                score: clamp_points(c.score, CRITERION_MAX),
            })
            .collect();
        let total = match raw.total {
            Some(t) => clamp_points(t, TOTAL_MAX),
            None if !criteria.is_empty() => {
                let sum: u32 = criteria.iter().map(|c| u32::from(c.score)).sum();
                sum.min(u32::from(TOTAL_MAX)) as u8
            }
            None => {
                return Err(ModelError::InvalidResponse(
                    "score JSON has neither a total nor criteria".into(),
                ))
            }
        };
        return Ok(PlagiarismScore {
            total,
            criteria,
            band: OriginalityBand::from_total(total),
            analysis: raw.analysis.unwrap_or_default().trim().to_string(),
        });
    }

    let figure = RE_OUT_OF_100
        .captures(reply)
        .or_else(|| RE_TOTAL.captures(reply))
        .and_then(|caps| caps[1].parse::<f64>().ok());
    match figure {
        Some(t) => {
            let total = clamp_points(t, TOTAL_MAX);
            Ok(PlagiarismScore {
                total,
                criteria: Vec::new(),
                band: OriginalityBand::from_total(total),
                analysis: reply.trim().to_string(),
            })
        }
        None => Err(ModelError::InvalidResponse(format!(
            "no originality score found in: {}",
            reply.chars().take(120).collect::<String>()
        ))),
    }
}

fn find_json(reply: &str) -> Option<RawScore> {
    if let Some(caps) = RE_JSON_FENCE.captures(reply) {
        if let Ok(raw) = serde_json::from_str(&caps[1]) {
            return Some(raw);
        }
    }
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&reply[start..=end]).ok()
}

fn clamp_points(value: f64, max: u8) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, f64::from(max)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_follow_rubric() {
        assert_eq!(OriginalityBand::from_total(100), OriginalityBand::HighlyOriginal);
        assert_eq!(OriginalityBand::from_total(90), OriginalityBand::HighlyOriginal);
        assert_eq!(OriginalityBand::from_total(89), OriginalityBand::MostlyOriginal);
        assert_eq!(OriginalityBand::from_total(50), OriginalityBand::ModeratelyOriginal);
        assert_eq!(OriginalityBand::from_total(30), OriginalityBand::NeedsImprovement);
        assert_eq!(OriginalityBand::from_total(29), OriginalityBand::SignificantConcerns);
    }

    #[test]
    fn parses_bare_json() {
        let s = parse_score(
            r#"{"criteria":[{"name":"Content Structure","score":18}],"total":81,"analysis":" solid "}"#,
        )
        .unwrap();
        assert_eq!(s.total, 81);
        assert_eq!(s.band, OriginalityBand::MostlyOriginal);
        assert_eq!(s.criteria[0].score, 18);
        assert_eq!(s.analysis, "solid");
    }

    #[test]
    fn parses_fenced_json_and_clamps() {
        let reply = "Here you go:\n```json\n{\"criteria\":[{\"name\":\"a\",\"score\":35},{\"name\":\"b\",\"score\":-2}],\"total\":140}\n```";
        let s = parse_score(reply).unwrap();
        assert_eq!(s.criteria[0].score, 20);
        assert_eq!(s.criteria[1].score, 0);
        assert_eq!(s.total, 100);
    }

    #[test]
    fn missing_total_is_sum_of_criteria() {
        let reply = r#"{"criteria":[{"name":"a","score":15},{"name":"b","score":12.6}]}"#;
        let s = parse_score(reply).unwrap();
        assert_eq!(s.total, 28);
        assert_eq!(s.band, OriginalityBand::SignificantConcerns);
    }

    #[test]
    fn falls_back_to_figure_in_prose() {
        let s = parse_score("Overall the piece scores 74/100 for originality.").unwrap();
        assert_eq!(s.total, 74);
        assert!(s.criteria.is_empty());

        let s = parse_score("Total: 55\nMostly paraphrased.").unwrap();
        assert_eq!(s.total, 55);
    }

    #[test]
    fn no_score_is_invalid_response() {
        let err = parse_score("I cannot evaluate this.").unwrap_err();
        assert!(matches!(err, ModelError::InvalidResponse(_)));
    }
}
