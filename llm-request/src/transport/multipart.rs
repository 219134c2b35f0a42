//! Transport-neutral `multipart/form-data` payloads.

use crate::audio::AudioFile;
use crate::error::{LlmError, Result};

/// One named field of a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    /// Plain text field.
    Text(String),
    /// File upload.
    File(AudioFile),
}

/// An ordered multipart form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<(String, FormPart)>,
}

impl MultipartForm {
    /// Creates an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a text field.
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push((name.into(), FormPart::Text(value.into())));
        self
    }

    /// Appends a file field.
    #[must_use]
    pub fn file(mut self, name: impl Into<String>, file: AudioFile) -> Self {
        self.parts.push((name.into(), FormPart::File(file)));
        self
    }

    /// All fields in insertion order.
    #[must_use]
    pub fn parts(&self) -> &[(String, FormPart)] {
        &self.parts
    }

    /// First text field with the given name.
    #[must_use]
    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|(n, part)| match part {
            FormPart::Text(value) if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    /// First file field with the given name.
    #[must_use]
    pub fn get_file(&self, name: &str) -> Option<&AudioFile> {
        self.parts.iter().find_map(|(n, part)| match part {
            FormPart::File(file) if n == name => Some(file),
            _ => None,
        })
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether the form has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl TryFrom<MultipartForm> for reqwest::multipart::Form {
    type Error = LlmError;

    fn try_from(form: MultipartForm) -> std::result::Result<Self, Self::Error> {
        form.parts
            .into_iter()
            .try_fold(Self::new(), |acc, (name, part)| match part {
                FormPart::Text(value) => Ok(acc.text(name, value)),
                FormPart::File(file) => {
                    let part = reqwest::multipart::Part::bytes(file.data.to_vec())
                        .file_name(file.name)
                        .mime_str(&file.mime)
                        .map_err(|e| LlmError::internal(format!("Invalid MIME type: {e}")))?;
                    Ok(acc.part(name, part))
                }
            })
    }
}

/// Converts a form for a reqwest request.
pub(crate) fn into_reqwest(form: MultipartForm) -> Result<reqwest::multipart::Form> {
    Ok(reqwest::multipart::Form::try_from(form)?)
}
