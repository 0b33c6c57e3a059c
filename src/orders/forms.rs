//! Typed service-order forms keyed by service slug. Field names match the JSON the
//! backend stores in `form_data`.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::validation::{ValidationErrors, Validator};

pub const ATTACHED_FILE: &str = "attached_file";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverType {
    Hard,
    #[default]
    Soft,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TranslationForm {
    pub document_title: String,
    pub source_language: String,
    pub target_language: String,
    pub special_instructions: String,
    pub contact_phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrintedPublicationForm {
    pub book_title: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub book_pages: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub quantity: u32,
    pub cover_type: CoverType,
    #[serde(rename = "includeISBN")]
    pub include_isbn: bool,
    pub contact_phone: String,
    pub delivery_address: String,
}

impl Default for PrintedPublicationForm {
    fn default() -> Self {
        Self {
            book_title: String::new(),
            book_pages: 0,
            quantity: 1,
            cover_type: CoverType::default(),
            include_isbn: false,
            contact_phone: String::new(),
            delivery_address: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlagiarismForm {
    pub document_title: String,
    pub contact_phone: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LiteracyCheckForm {
    pub document_content: String,
    pub contact_phone: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrcidIntegrationForm {
    pub orcid_id: String,
    pub full_name: String,
    pub institution: String,
    pub contact_phone: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UdcClassificationForm {
    pub article_title: String,
    pub article_abstract: String,
    pub contact_phone: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScholarIndexingForm {
    pub article_title: String,
    pub article_url: String,
    #[serde(rename = "articleDOI")]
    pub article_doi: Option<String>,
    pub additional_notes: String,
    pub contact_phone: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatisticalReportForm {
    #[serde(alias = "title")]
    pub report_type: String,
    pub date_range: String,
    pub custom_start_date: Option<String>,
    pub custom_end_date: Option<String>,
    pub additional_notes: String,
    pub contact_phone: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocumentPreviewForm {
    pub contact_phone: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CoAuthorForm {
    pub co_author_name: String,
    pub co_author_email: String,
    pub co_author_institution: String,
    #[serde(rename = "coAuthorORCID")]
    pub co_author_orcid: Option<String>,
    pub contact_phone: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ServiceForm {
    Translation(TranslationForm),
    PrintedPublications(PrintedPublicationForm),
    Plagiarism(PlagiarismForm),
    LiteracyCheck(LiteracyCheckForm),
    OrcidIntegration(OrcidIntegrationForm),
    UdcClassification(UdcClassificationForm),
    GoogleScholarIndexing(ScholarIndexingForm),
    StatisticalReports(StatisticalReportForm),
    DocumentPreview(DocumentPreviewForm),
    CoAuthor(CoAuthorForm),
}

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("Unknown service: {0}")]
    UnknownService(String),
    #[error("Malformed form data: {0}")]
    Malformed(String),
}

impl ServiceForm {
    pub const SLUGS: [&'static str; 10] = [
        "translation",
        "printed-publications",
        "plagiarism",
        "literacy-check",
        "orcid-integration",
        "udc-classification",
        "google-scholar-indexing",
        "statistical-reports",
        "document-preview",
        "co-author",
    ];

    pub fn parse(slug: &str, data: Value) -> Result<Self, FormError> {
        fn typed<T: serde::de::DeserializeOwned>(data: Value) -> Result<T, FormError> {
            serde_json::from_value(data).map_err(|e| FormError::Malformed(e.to_string()))
        }
        Ok(match slug {
            "translation" => Self::Translation(typed(data)?),
            "printed-publications" => Self::PrintedPublications(typed(data)?),
            "plagiarism" => Self::Plagiarism(typed(data)?),
            "literacy-check" => Self::LiteracyCheck(typed(data)?),
            "orcid-integration" => Self::OrcidIntegration(typed(data)?),
            "udc-classification" => Self::UdcClassification(typed(data)?),
            "google-scholar-indexing" => Self::GoogleScholarIndexing(typed(data)?),
            "statistical-reports" => Self::StatisticalReports(typed(data)?),
            "document-preview" => Self::DocumentPreview(typed(data)?),
            "co-author" => Self::CoAuthor(typed(data)?),
            other => return Err(FormError::UnknownService(other.to_string())),
        })
    }

    pub fn requires_file(&self) -> bool {
        matches!(
            self,
            Self::Translation(_) | Self::Plagiarism(_) | Self::LiteracyCheck(_) | Self::DocumentPreview(_)
        )
    }

    /// Check every field locally; nothing is sent to the backend when this fails.
    pub fn validate(&self, has_file: bool) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        match self {
            Self::Translation(f) => {
                v.required("documentTitle", &f.document_title)
                    .phone("contactPhone", &f.contact_phone);
            }
            Self::PrintedPublications(f) => {
                v.required("bookTitle", &f.book_title)
                    .positive("bookPages", f.book_pages)
                    .positive("quantity", f.quantity)
                    .phone("contactPhone", &f.contact_phone);
            }
            Self::Plagiarism(f) => {
                v.required("documentTitle", &f.document_title)
                    .phone("contactPhone", &f.contact_phone);
            }
            Self::LiteracyCheck(f) => {
                v.phone("contactPhone", &f.contact_phone);
            }
            Self::OrcidIntegration(f) => {
                v.orcid("orcidId", &f.orcid_id)
                    .phone("contactPhone", &f.contact_phone);
            }
            Self::UdcClassification(f) => {
                v.required("articleTitle", &f.article_title)
                    .required("articleAbstract", &f.article_abstract)
                    .phone("contactPhone", &f.contact_phone);
            }
            Self::GoogleScholarIndexing(f) => {
                v.required("articleTitle", &f.article_title)
                    .url("articleUrl", &f.article_url)
                    .optional_doi("articleDOI", f.article_doi.as_deref())
                    .phone("contactPhone", &f.contact_phone);
            }
            Self::StatisticalReports(f) => {
                v.required("reportType", &f.report_type)
                    .phone("contactPhone", &f.contact_phone);
                if f.date_range == "custom" {
                    v.required("customStartDate", f.custom_start_date.as_deref().unwrap_or_default())
                        .required("customEndDate", f.custom_end_date.as_deref().unwrap_or_default());
                }
            }
            Self::DocumentPreview(f) => {
                v.phone("contactPhone", &f.contact_phone);
            }
            Self::CoAuthor(f) => {
                v.required("coAuthorName", &f.co_author_name)
                    .email("coAuthorEmail", &f.co_author_email)
                    .phone("contactPhone", &f.contact_phone);
                if let Some(orcid) = f.co_author_orcid.as_deref().filter(|o| !o.trim().is_empty()) {
                    v.orcid("coAuthorORCID", orcid);
                }
            }
        }
        if self.requires_file() {
            v.file(ATTACHED_FILE, has_file);
        }
        v.finish()
    }
}

/// Browsers send numeric inputs as strings; accept both.
fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| de::Error::custom("expected a non-negative integer")),
        Value::String(s) if s.trim().is_empty() => Ok(0),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("not a number: {s}"))),
        Value::Null => Ok(0),
        other => Err(de::Error::custom(format!("expected a number, got {other}"))),
    }
}
