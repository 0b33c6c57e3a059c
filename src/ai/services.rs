use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::client::{AiError, GenerationOptions, TextModel};

pub const KEYWORD_COUNT: usize = 5;
pub const TITLE_COUNT: usize = 3;
const DEFAULT_REPORT: &str = "AI did not provide a report.";

lazy_static! {
    static ref FENCE_RE: Regex = Regex::new(r"(?s)^```(\w*)?\s*\n?(.*?)\n?\s*```$").unwrap();
}

/// Drops a surrounding markdown code fence, if the model added one.
fn strip_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    FENCE_RE
        .captures(trimmed)
        .and_then(|c| c.get(2))
        .map(|m| m.as_str().trim())
        .unwrap_or(trimmed)
}

fn parse_json<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, AiError> {
    serde_json::from_str(strip_fence(raw)).map_err(|e| AiError::Parse(e.to_string()))
}

fn require(value: &str, message: &str) -> Result<(), AiError> {
    if value.trim().is_empty() {
        return Err(AiError::InvalidInput(message.to_string()));
    }
    Ok(())
}

pub fn parse_keywords(raw: &str) -> Vec<String> {
    strip_fence(raw)
        .trim_matches(|c| c == '"' || c == '\'')
        .split(',')
        .map(|k| k.trim().trim_matches(|c| c == '"' || c == '\'').trim())
        .filter(|k| !k.is_empty())
        .take(KEYWORD_COUNT)
        .map(str::to_string)
        .collect()
}

#[instrument(skip_all)]
pub async fn suggest_keywords(
    model: &dyn TextModel,
    title: &str,
    abstract_text: &str,
) -> Result<Vec<String>, AiError> {
    require(title, "Title is required to suggest keywords")?;
    require(abstract_text, "Abstract is required to suggest keywords")?;
    let prompt = format!(
        "Based on the following scientific article title and abstract, suggest {KEYWORD_COUNT} \
         relevant keywords. Return them as a single comma-separated string with no extra text.\n\n\
         Title: {title}\n\nAbstract: {abstract_text}"
    );
    let raw = model.generate(&prompt, GenerationOptions::default()).await?;
    let keywords = parse_keywords(&raw);
    debug!(count = keywords.len(), "keywords suggested");
    Ok(keywords)
}

pub fn parse_titles(raw: &str) -> Result<Vec<String>, AiError> {
    let titles: Vec<String> = parse_json(raw)?;
    Ok(titles
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .take(TITLE_COUNT)
        .collect())
}

#[instrument(skip_all, fields(keywords = keywords.len()))]
pub async fn suggest_titles(
    model: &dyn TextModel,
    abstract_text: &str,
    keywords: &[String],
) -> Result<Vec<String>, AiError> {
    require(abstract_text, "Abstract is required to suggest titles")?;
    let prompt = format!(
        "Based on the following abstract and keywords of a scientific article, suggest \
         {TITLE_COUNT} concise and informative titles. Return a JSON array of strings only.\n\n\
         Abstract: {abstract_text}\n\nKeywords: {}",
        keywords.join(", ")
    );
    let raw = model
        .generate(&prompt, GenerationOptions { json: true, temperature: None })
        .await?;
    parse_titles(&raw)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteracyReport {
    #[serde(default = "default_report")]
    pub report: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

fn default_report() -> String {
    DEFAULT_REPORT.to_string()
}

pub fn parse_literacy(raw: &str) -> Result<LiteracyReport, AiError> {
    let mut report: LiteracyReport = parse_json(raw)?;
    if report.report.trim().is_empty() {
        report.report = default_report();
    }
    Ok(report)
}

#[instrument(skip_all, fields(chars = text.len()))]
pub async fn analyze_literacy(model: &dyn TextModel, text: &str) -> Result<LiteracyReport, AiError> {
    require(text, "Text is required for the literacy check")?;
    let prompt = format!(
        "You are an academic editor. Review the following text for grammar, spelling, \
         punctuation and style. Respond with a JSON object with two fields: \"report\", a short \
         summary of the text's overall quality, and \"suggestions\", an array of concrete \
         corrections.\n\nText:\n{text}"
    );
    let raw = model
        .generate(&prompt, GenerationOptions { json: true, temperature: Some(0.0) })
        .await?;
    parse_literacy(&raw)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    Latin,
    Cyrillic,
}

impl Script {
    fn opposite(self) -> Self {
        match self {
            Script::Latin => Script::Cyrillic,
            Script::Cyrillic => Script::Latin,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Script::Latin => "Latin",
            Script::Cyrillic => "Cyrillic",
        }
    }
}

#[instrument(skip_all, fields(target = ?target))]
pub async fn transliterate(model: &dyn TextModel, text: &str, target: Script) -> Result<String, AiError> {
    require(text, "Text is required for transliteration")?;
    let prompt = format!(
        "Transliterate the following Uzbek text from {} script to {} script. \
         Return only the transliterated text.\n\n{text}",
        target.opposite().label(),
        target.label()
    );
    let raw = model
        .generate(&prompt, GenerationOptions { json: false, temperature: Some(0.0) })
        .await?;
    Ok(strip_fence(&raw).to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlagiarismEstimate {
    pub similarity_percentage: f64,
    pub ai_content_probability: f64,
}

#[derive(Deserialize)]
struct RawEstimate {
    #[serde(default)]
    similarity_percentage: f64,
    #[serde(default)]
    ai_content_probability: f64,
}

fn percent(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

pub fn parse_plagiarism(raw: &str) -> Result<PlagiarismEstimate, AiError> {
    let est: RawEstimate = parse_json(raw)?;
    Ok(PlagiarismEstimate {
        similarity_percentage: percent(est.similarity_percentage),
        ai_content_probability: percent(est.ai_content_probability),
    })
}

/// Rough estimate only; the formal check is the paid plagiarism service.
#[instrument(skip_all, fields(chars = text.len()))]
pub async fn estimate_plagiarism(model: &dyn TextModel, text: &str) -> Result<PlagiarismEstimate, AiError> {
    require(text, "Text is required for the plagiarism check")?;
    let prompt = format!(
        "Estimate how original the following academic text is. Respond with a JSON object with \
         the numeric fields \"similarity_percentage\" (0-100, share of text likely copied from \
         existing sources) and \"ai_content_probability\" (0-100, likelihood the text was \
         machine generated).\n\nText:\n{text}"
    );
    let raw = model
        .generate(&prompt, GenerationOptions { json: true, temperature: Some(0.0) })
        .await?;
    parse_plagiarism(&raw)
}
