use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

lazy_static! {
    static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9\s\-\(\)]+$").unwrap();
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    static ref ORCID_RE: Regex = Regex::new(r"^\d{4}-\d{4}-\d{4}-\d{3}[\dX]$").unwrap();
    static ref DOI_RE: Regex = Regex::new(r"^10\.\d{4,9}/\S+$").unwrap();
    static ref URL_RE: Regex = Regex::new(r"^https?://\S+$").unwrap();
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone.trim())
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

pub fn is_valid_orcid(orcid: &str) -> bool {
    ORCID_RE.is_match(orcid.trim())
}

pub fn is_valid_doi(doi: &str) -> bool {
    DOI_RE.is_match(doi.trim())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Error, Serialize)]
#[error("validation failed on {} field(s)", .0.len())]
pub struct ValidationErrors(pub Vec<FieldError>);

#[cfg(test)]
impl ValidationErrors {
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

/// Collects field errors; a field that fails `required` is not checked again.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.push(field, "This field is required.");
        }
        self
    }

    pub fn phone(&mut self, field: &str, value: &str) -> &mut Self {
        self.required(field, value);
        if !self.failed(field) && !is_valid_phone(value) {
            self.push(field, "Enter a valid phone number.");
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        self.required(field, value);
        if !self.failed(field) && !is_valid_email(value) {
            self.push(field, "Enter a valid email address.");
        }
        self
    }

    pub fn orcid(&mut self, field: &str, value: &str) -> &mut Self {
        self.required(field, value);
        if !self.failed(field) && !is_valid_orcid(value) {
            self.push(field, "ORCID must look like 0000-0000-0000-000X.");
        }
        self
    }

    /// DOI is optional wherever it appears; only a present value is checked.
    pub fn optional_doi(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(doi) = value.filter(|v| !v.trim().is_empty()) {
            if !is_valid_doi(doi) {
                self.push(field, "Enter a valid DOI, e.g. 10.1000/xyz123.");
            }
        }
        self
    }

    pub fn url(&mut self, field: &str, value: &str) -> &mut Self {
        self.required(field, value);
        if !self.failed(field) && !URL_RE.is_match(value.trim()) {
            self.push(field, "Enter a valid http(s) URL.");
        }
        self
    }

    pub fn positive(&mut self, field: &str, value: u32) -> &mut Self {
        if value == 0 {
            self.push(field, "Must be greater than zero.");
        }
        self
    }

    pub fn min_len(&mut self, field: &str, value: &str, min: usize) -> &mut Self {
        if !self.failed(field) && value.chars().count() < min {
            self.push(field, &format!("Must be at least {min} characters."));
        }
        self
    }

    pub fn file(&mut self, field: &str, present: bool) -> &mut Self {
        if !present {
            self.push(field, "A file must be attached.");
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(std::mem::take(&mut self.errors)))
        }
    }

    fn failed(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    fn push(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }
}
