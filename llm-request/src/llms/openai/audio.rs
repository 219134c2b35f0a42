//! OpenAI Audio API implementation (speech & translation).

use tracing::debug;

use crate::audio::{SpeechOutput, SpeechRequest, TranslationRequest};
use crate::env::RuntimeEnvironment;
use crate::error::{Error, LlmError, Result};

use super::client::{OpenAI, SPEECH_URL, TRANSLATIONS_URL};
use super::types::OpenAITranslationResponse;

impl OpenAI {
    /// Synthesizes speech.
    ///
    /// On a server the audio comes back as bytes; in a browser it is wrapped
    /// by the client's [`ObjectUrlFactory`](crate::audio::ObjectUrlFactory)
    /// and returned as a URL. For an unknown environment nothing is sent.
    ///
    /// # Errors
    ///
    /// Transport failures, non-2xx statuses, a failing URL factory, or
    /// [`Error::UnsupportedEnvironment`] in strict mode.
    pub async fn speech(
        &self,
        request: &SpeechRequest,
        api_key: &str,
        env: RuntimeEnvironment,
    ) -> Result<SpeechOutput> {
        if !self.check_environment(env)? {
            return Ok(SpeechOutput::Unknown);
        }

        debug!(
            model = %request.model,
            voice = %request.voice,
            chars = request.input.chars().count(),
            environment = %env,
            "OpenAI speech request"
        );
        let audio = self.post_json(SPEECH_URL, api_key, request).await?.body;

        match env {
            RuntimeEnvironment::Browser => {
                let mime = request.effective_format().mime_type();
                let url = self.object_urls.create_object_url(&audio, mime)?;
                Ok(SpeechOutput::Browser(url))
            }
            _ => Ok(SpeechOutput::Server(audio)),
        }
    }

    /// Translates audio into English text.
    ///
    /// JSON response formats are decoded and their `text` returned; `text`,
    /// `srt` and `vtt` bodies are returned as sent.
    ///
    /// # Errors
    ///
    /// A usage error, before any request is sent, when the form has no `file`
    /// or `model`. Otherwise transport failures, non-2xx statuses, and JSON
    /// bodies without `text`.
    pub async fn transition(&self, request: TranslationRequest, api_key: &str) -> Result<String> {
        let format = request.response_format();
        let form = request.into_form();
        if form.get_file("file").is_none() {
            return Err(Error::usage("translation form requires a `file` part"));
        }
        if form.get_text("model").is_none() {
            return Err(Error::usage("translation form requires a `model` field"));
        }

        debug!(
            parts = form.len(),
            format = format.as_str(),
            "OpenAI translation request"
        );
        let response = self.post_multipart(TRANSLATIONS_URL, api_key, form).await?;

        if !format.is_json() {
            return Ok(response.text());
        }
        let translation: OpenAITranslationResponse = serde_json::from_slice(&response.body)
            .map_err(|e| {
                LlmError::response_format("JSON translation with `text`", format!("parse error: {e}"))
            })?;
        Ok(translation.text)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;
    use http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::audio::{
        AudioFile, AudioFormat, ObjectUrlFactory, TranslationOptions, TranslationResponseFormat,
    };
    use crate::llms::openai::OpenAIConfig;
    use crate::transport::{MockTransport, MultipartForm};

    fn client() -> (OpenAI, Arc<MockTransport>) {
        let transport = Arc::new(MockTransport::new());
        let openai = OpenAI::with_transport(OpenAIConfig::default(), Arc::clone(&transport) as _);
        (openai, transport)
    }

    fn speech_request() -> SpeechRequest {
        SpeechRequest::new("tts-1", "Hello world", "alloy")
    }

    fn audio_file() -> AudioFile {
        AudioFile::from_bytes("clip.mp3", Bytes::from_static(b"ID3 fake"))
    }

    #[derive(Debug)]
    struct FixedUrl;

    impl ObjectUrlFactory for FixedUrl {
        fn create_object_url(&self, audio: &Bytes, mime: &str) -> Result<String> {
            Ok(format!("blob:test/{}/{mime}", audio.len()))
        }
    }

    mod speech {
        use super::*;

        #[tokio::test]
        async fn server_returns_bytes() {
            let (openai, transport) = client();
            transport.push_body(StatusCode::OK, Bytes::from_static(&[0xff, 0xfb, 0x90]));

            let out = openai
                .speech(&speech_request(), "abc", RuntimeEnvironment::Server)
                .await
                .unwrap();

            assert_eq!(out.as_bytes().unwrap().as_ref(), &[0xff, 0xfb, 0x90]);
            let sent = transport.last_request().unwrap();
            assert_eq!(sent.url, SPEECH_URL);
            assert_eq!(sent.json_body().unwrap()["voice"], "alloy");
        }

        #[tokio::test]
        async fn browser_returns_data_url_by_default() {
            let (openai, transport) = client();
            transport.push_body(StatusCode::OK, "abc");

            let out = openai
                .speech(&speech_request(), "abc", RuntimeEnvironment::Browser)
                .await
                .unwrap();

            assert_eq!(out.as_url(), Some("data:audio/mpeg;base64,YWJj"));
        }

        #[tokio::test]
        async fn browser_uses_custom_factory_and_format() {
            let (openai, transport) = client();
            let openai = openai.with_object_urls(Arc::new(FixedUrl));
            transport.push_body(StatusCode::OK, "1234");

            let out = openai
                .speech(
                    &speech_request().format(AudioFormat::Wav),
                    "abc",
                    RuntimeEnvironment::Browser,
                )
                .await
                .unwrap();

            assert_eq!(out.as_url(), Some("blob:test/4/audio/wav"));
        }

        #[derive(Clone, Default)]
        struct Captured(Arc<std::sync::Mutex<Vec<u8>>>);

        impl std::io::Write for Captured {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        #[tokio::test]
        async fn logs_input_length_in_chars() {
            let captured = Captured::default();
            let writer = captured.clone();
            let subscriber = tracing_subscriber::fmt()
                .with_max_level(tracing::Level::DEBUG)
                .with_ansi(false)
                .with_writer(move || writer.clone())
                .finish();
            let _guard = tracing::subscriber::set_default(subscriber);

            let (openai, transport) = client();
            transport.push_body(StatusCode::OK, "mp3");
            openai
                .speech(
                    &SpeechRequest::new("tts-1", "héllo 世界", "alloy"),
                    "abc",
                    RuntimeEnvironment::Server,
                )
                .await
                .unwrap();

            let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
            assert!(logs.contains("chars=8"), "{logs}");
        }

        #[tokio::test]
        async fn unknown_environment_sends_nothing() {
            let (openai, transport) = client();

            let out = openai
                .speech(&speech_request(), "abc", RuntimeEnvironment::Unknown)
                .await
                .unwrap();

            assert!(out.is_unknown());
            assert_eq!(transport.calls(), 0);
        }

        #[tokio::test]
        async fn error_status_propagates() {
            let (openai, transport) = client();
            transport.push_body(StatusCode::BAD_REQUEST, r#"{"error":{"message":"bad voice"}}"#);

            let err = openai
                .speech(&speech_request(), "abc", RuntimeEnvironment::Server)
                .await
                .unwrap_err();
            assert!(err.to_string().contains("bad voice"));
        }
    }

    mod transition {
        use super::*;

        #[tokio::test]
        async fn json_format_returns_text() {
            let (openai, transport) = client();
            transport.push_json(json!({"text": "Hello, how are you?"}));

            let text = openai
                .transition(TranslationOptions::new(audio_file()).into(), "abc")
                .await
                .unwrap();

            assert_eq!(text, "Hello, how are you?");
            let sent = transport.last_request().unwrap();
            assert_eq!(sent.url, TRANSLATIONS_URL);
            let form = sent.form().unwrap();
            assert_eq!(form.get_text("model"), Some("whisper-1"));
            assert_eq!(form.get_file("file").unwrap().name, "clip.mp3");
        }

        #[tokio::test]
        async fn text_format_returns_body() {
            let (openai, transport) = client();
            transport.push_body(StatusCode::OK, "1\n00:00:00,000 --> 00:00:01,000\nHi\n");

            let request = TranslationOptions::new(audio_file())
                .response_format(TranslationResponseFormat::Srt)
                .into();
            let text = openai.transition(request, "abc").await.unwrap();

            assert!(text.contains("-->"));
        }

        #[tokio::test]
        async fn caller_form_is_sent_as_is() {
            let (openai, transport) = client();
            transport.push_body(StatusCode::OK, "plain");

            let form = MultipartForm::new()
                .file("file", audio_file())
                .text("model", "whisper-1")
                .text("response_format", "text");
            let text = openai.transition(form.clone().into(), "abc").await.unwrap();

            assert_eq!(text, "plain");
            assert_eq!(transport.last_request().unwrap().form(), Some(&form));
        }

        #[tokio::test]
        async fn form_without_file_is_usage_error() {
            let (openai, transport) = client();

            let form = MultipartForm::new().text("model", "whisper-1");
            let err = openai.transition(form.into(), "abc").await.unwrap_err();

            assert!(err.is_usage());
            assert_eq!(transport.calls(), 0);
        }

        #[tokio::test]
        async fn json_without_text_is_malformed() {
            let (openai, transport) = client();
            transport.push_json(json!({"data": "wrong field"}));

            let err = openai
                .transition(TranslationOptions::new(audio_file()).into(), "abc")
                .await
                .unwrap_err();
            assert!(err.is_malformed());
        }
    }
}
