//! Audio request and response types.
//!
//! - **Speech**: text in, synthesized audio out ([`SpeechRequest`] ->
//!   [`SpeechOutput`]).
//! - **Transition**: audio in, English text out ([`TranslationRequest`] ->
//!   `String`), served by the `/v1/audio/translations` endpoint.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm_request::prelude::*;
//!
//! let speech = SpeechRequest::new("tts-1", "Hello, world!", "alloy").format(AudioFormat::Mp3);
//! match client.audio(AudioRequest::Speech(speech)).await? {
//!     AudioOutput::Speech(SpeechOutput::Server(bytes)) => std::fs::write("out.mp3", bytes)?,
//!     other => println!("{other:?}"),
//! }
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::transport::MultipartForm;

/// Output format for synthesized speech.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MP3 format
    #[default]
    Mp3,
    /// Opus format
    Opus,
    /// AAC format
    Aac,
    /// FLAC format
    Flac,
    /// WAV format
    Wav,
    /// PCM format (raw audio)
    Pcm,
}

impl AudioFormat {
    /// Get the file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Opus => "opus",
            Self::Aac => "aac",
            Self::Flac => "flac",
            Self::Wav => "wav",
            Self::Pcm => "pcm",
        }
    }

    /// Get the MIME type for this format.
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Opus => "audio/opus",
            Self::Aac => "audio/aac",
            Self::Flac => "audio/flac",
            Self::Wav => "audio/wav",
            Self::Pcm => "audio/pcm",
        }
    }
}

/// Request for generating speech from text.
///
/// # Models
/// - `tts-1`: Standard quality, lower latency
/// - `tts-1-hd`: Higher quality, higher latency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechRequest {
    /// Model to use (e.g., "tts-1", "tts-1-hd").
    pub model: String,
    /// Text to convert to speech.
    pub input: String,
    /// Voice identifier (e.g., "alloy", "echo", "fable", "onyx", "nova", "shimmer").
    pub voice: String,
    /// Output audio format; the provider defaults to mp3.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<AudioFormat>,
    /// Speaking speed (0.25 to 4.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
}

impl SpeechRequest {
    /// Create a new speech request.
    #[must_use]
    pub fn new(model: impl Into<String>, input: impl Into<String>, voice: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            input: input.into(),
            voice: voice.into(),
            response_format: None,
            speed: None,
        }
    }

    /// Set the output format.
    #[must_use]
    pub const fn format(mut self, format: AudioFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    /// Set the speaking speed (0.25 to 4.0).
    #[must_use]
    pub const fn speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }

    /// The format the audio will come back in.
    #[must_use]
    pub fn effective_format(&self) -> AudioFormat {
        self.response_format.unwrap_or_default()
    }
}

/// Synthesized speech, shaped by the runtime environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechOutput {
    /// Raw audio bytes (server).
    Server(Bytes),
    /// Object URL referencing the audio (browser).
    Browser(String),
    /// The environment is unknown; no request was made.
    Unknown,
}

impl SpeechOutput {
    /// Raw audio, when running server-side.
    #[must_use]
    pub const fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Server(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Object URL, when running in a browser.
    #[must_use]
    pub fn as_url(&self) -> Option<&str> {
        match self {
            Self::Browser(url) => Some(url),
            _ => None,
        }
    }

    /// Whether no result was produced.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

/// Mints browser-side handles for binary audio.
pub trait ObjectUrlFactory: fmt::Debug + Send + Sync {
    /// Wrap `audio` and return a URL that resolves to it.
    fn create_object_url(&self, audio: &Bytes, mime: &str) -> Result<String>;
}

/// Encodes audio inline as a `data:` URL.
///
/// Usable anywhere an object URL is, e.g. as an `<audio>` source, and needs no
/// host blob registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUrlFactory;

impl ObjectUrlFactory for DataUrlFactory {
    fn create_object_url(&self, audio: &Bytes, mime: &str) -> Result<String> {
        Ok(format!("data:{mime};base64,{}", STANDARD.encode(audio)))
    }
}

/// An audio file to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFile {
    /// File name sent with the upload; its extension tells the provider the format.
    pub name: String,
    /// File contents.
    pub data: Bytes,
    /// MIME type.
    pub mime: String,
}

impl AudioFile {
    /// Wraps in-memory audio, guessing the MIME type from the name.
    #[must_use]
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let name = name.into();
        let mime = mime_guess::from_path(&name)
            .first_or_octet_stream()
            .essence_str()
            .to_owned();
        Self {
            name,
            data: data.into(),
            mime,
        }
    }

    /// Reads a file from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map_or_else(|| "audio".to_owned(), |n| n.to_string_lossy().into_owned());
        Ok(Self::from_bytes(name, data))
    }

    /// Overrides the MIME type.
    #[must_use]
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = mime.into();
        self
    }
}

/// Output format for translation responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TranslationResponseFormat {
    /// JSON with a `text` field.
    #[default]
    Json,
    /// Plain text.
    Text,
    /// SRT subtitles.
    Srt,
    /// Verbose JSON with segments.
    VerboseJson,
    /// VTT subtitles.
    Vtt,
}

impl TranslationResponseFormat {
    /// Get the format string for API requests.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
            Self::Srt => "srt",
            Self::VerboseJson => "verbose_json",
            Self::Vtt => "vtt",
        }
    }

    /// Whether the response body is a JSON document.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self, Self::Json | Self::VerboseJson)
    }

    /// Parse the API format string.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "json" => Some(Self::Json),
            "text" => Some(Self::Text),
            "srt" => Some(Self::Srt),
            "verbose_json" => Some(Self::VerboseJson),
            "vtt" => Some(Self::Vtt),
            _ => None,
        }
    }
}

/// Structured options for translating audio into English text.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationOptions {
    /// Audio to translate.
    pub file: AudioFile,
    /// Model (`whisper-1`).
    pub model: String,
    /// Optional text to guide the model's style.
    pub prompt: Option<String>,
    /// Output format.
    pub response_format: Option<TranslationResponseFormat>,
    /// Sampling temperature (0.0 to 1.0).
    pub temperature: Option<f32>,
}

impl TranslationOptions {
    /// Default translation model.
    pub const DEFAULT_MODEL: &'static str = "whisper-1";

    /// Options for `file` using the default model.
    #[must_use]
    pub fn new(file: AudioFile) -> Self {
        Self {
            file,
            model: Self::DEFAULT_MODEL.to_owned(),
            prompt: None,
            response_format: None,
            temperature: None,
        }
    }

    /// Set the model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the prompt.
    #[must_use]
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Set the response format.
    #[must_use]
    pub const fn response_format(mut self, format: TranslationResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    /// Set the temperature.
    #[must_use]
    pub const fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Lays the options out as form fields.
    #[must_use]
    pub fn into_form(self) -> MultipartForm {
        let mut form = MultipartForm::new()
            .file("file", self.file)
            .text("model", self.model);
        if let Some(prompt) = self.prompt {
            form = form.text("prompt", prompt);
        }
        if let Some(format) = self.response_format {
            form = form.text("response_format", format.as_str());
        }
        if let Some(temperature) = self.temperature {
            form = form.text("temperature", temperature.to_string());
        }
        form
    }
}

/// Body of a translation request.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationRequest {
    /// Structured options.
    Options(TranslationOptions),
    /// A form the caller assembled (must carry `file` and `model`).
    Form(MultipartForm),
}

impl TranslationRequest {
    /// The response format the request asks for.
    #[must_use]
    pub fn response_format(&self) -> TranslationResponseFormat {
        let format = match self {
            Self::Options(options) => options.response_format,
            Self::Form(form) => form
                .get_text("response_format")
                .and_then(TranslationResponseFormat::parse),
        };
        format.unwrap_or_default()
    }

    /// The multipart payload to send.
    #[must_use]
    pub fn into_form(self) -> MultipartForm {
        match self {
            Self::Options(options) => options.into_form(),
            Self::Form(form) => form,
        }
    }
}

impl From<TranslationOptions> for TranslationRequest {
    fn from(options: TranslationOptions) -> Self {
        Self::Options(options)
    }
}

impl From<MultipartForm> for TranslationRequest {
    fn from(form: MultipartForm) -> Self {
        Self::Form(form)
    }
}

/// Which audio operation to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioKind {
    /// Text to speech.
    Speech,
    /// Speech to English text.
    Transition,
}

impl AudioKind {
    /// Wire code (`"1"` or `"2"`).
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Speech => "1",
            Self::Transition => "2",
        }
    }
}

impl FromStr for AudioKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "speech" => Ok(Self::Speech),
            "2" | "transition" | "translation" => Ok(Self::Transition),
            other => Err(Error::usage(format!("unrecognized audio kind: {other:?}"))),
        }
    }
}

/// An audio operation together with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioRequest {
    /// Text to speech.
    Speech(SpeechRequest),
    /// Speech to English text.
    Transition(TranslationRequest),
}

impl AudioRequest {
    /// The operation this request selects.
    #[must_use]
    pub const fn kind(&self) -> AudioKind {
        match self {
            Self::Speech(_) => AudioKind::Speech,
            Self::Transition(_) => AudioKind::Transition,
        }
    }
}

/// Result of [`LlmRequest::audio`](crate::LlmRequest::audio).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioOutput {
    /// Synthesized speech.
    Speech(SpeechOutput),
    /// Translated text.
    Transition(String),
}
