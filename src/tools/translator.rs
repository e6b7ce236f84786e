//! Translator tool - text translation via the MyMemory API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use super::{HandlerError, ToolHandler};

/// MyMemory translation endpoint
const MYMEMORY_API_URL: &str = "https://api.mymemory.translated.net/get";

/// Upstream request timeout
const HTTP_TIMEOUT_SECS: u64 = 10;

/// Common language codes served by the `languages` action
const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("zh", "Chinese"),
    ("ar", "Arabic"),
    ("hi", "Hindi"),
];

/// Translation tool
pub struct TranslatorTool {
    client: Client,
}

impl TranslatorTool {
    pub fn new() -> Result<Self, HandlerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }

    /// MyMemory spells auto-detection "Autodetect" in the langpair
    fn language_pair(from_lang: &str, to_lang: &str) -> String {
        let from = if from_lang.is_empty() || from_lang == "auto" {
            "Autodetect"
        } else {
            from_lang
        };
        format!("{}|{}", from, to_lang)
    }

    /// Shape a MyMemory response into the result payload
    fn parse_translation(text: &str, from_lang: &str, to_lang: &str, body: &Value) -> Result<Value, HandlerError> {
        let status = body["responseStatus"].as_u64().unwrap_or(0);
        if status != 200 {
            return Err(HandlerError::Upstream {
                message: format!(
                    "mymemory returned status {}: {}",
                    status,
                    body["responseDetails"].as_str().unwrap_or("unknown")
                ),
            });
        }

        let translated = body["responseData"]["translatedText"]
            .as_str()
            .ok_or_else(|| HandlerError::Upstream {
                message: "missing translatedText".to_string(),
            })?;

        Ok(json!({
            "action": "translate",
            "original_text": text,
            "translated_text": translated,
            "from_language": from_lang,
            "to_language": to_lang,
            "match": body["responseData"]["match"].as_f64().unwrap_or(0.0)
        }))
    }

    async fn translate(&self, text: &str, from_lang: &str, to_lang: &str) -> Result<Value, HandlerError> {
        let langpair = Self::language_pair(from_lang, to_lang);
        let response = self
            .client
            .get(MYMEMORY_API_URL)
            .query(&[("q", text), ("langpair", langpair.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HandlerError::Upstream {
                message: format!("mymemory returned status {}", status),
            });
        }

        let body: Value = response.json().await?;
        Self::parse_translation(text, from_lang, to_lang, &body)
    }

    fn list_languages() -> Value {
        let languages: Vec<Value> = LANGUAGES
            .iter()
            .map(|(code, name)| json!({"code": code, "name": name}))
            .collect();

        let count = languages.len();
        json!({
            "action": "languages",
            "languages": languages,
            "count": count
        })
    }
}

#[async_trait]
impl ToolHandler for TranslatorTool {
    fn name(&self) -> &'static str {
        "translator"
    }

    fn description(&self) -> &'static str {
        "Translate text between different languages"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["translate", "language", "translation", "spanish", "french", "german"]
    }

    async fn execute(&self, action: &str, params: &Value) -> Result<Value, HandlerError> {
        match action {
            "translate" | "execute" => {
                let text = params["text"]
                    .as_str()
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| HandlerError::invalid("no text provided"))?;
                let from_lang = params["from_lang"].as_str().unwrap_or("auto");
                let to_lang = params["to_lang"].as_str().unwrap_or("en");

                self.translate(text, from_lang, to_lang).await
            }
            "languages" => Ok(Self::list_languages()),
            other => Err(HandlerError::UnknownAction {
                action: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_pair_explicit() {
        assert_eq!(TranslatorTool::language_pair("en", "es"), "en|es");
    }

    #[test]
    fn test_language_pair_auto() {
        assert_eq!(TranslatorTool::language_pair("auto", "de"), "Autodetect|de");
        assert_eq!(TranslatorTool::language_pair("", "de"), "Autodetect|de");
    }

    #[test]
    fn test_parse_translation_success() {
        let body = json!({
            "responseStatus": 200,
            "responseData": {
                "translatedText": "Hola mundo",
                "match": 0.98
            }
        });

        let payload = TranslatorTool::parse_translation("Hello world", "en", "es", &body).unwrap();
        assert_eq!(payload["translated_text"], "Hola mundo");
        assert_eq!(payload["from_language"], "en");
        assert_eq!(payload["to_language"], "es");
    }

    #[test]
    fn test_parse_translation_upstream_error() {
        let body = json!({
            "responseStatus": 403,
            "responseDetails": "invalid language pair"
        });

        let err = TranslatorTool::parse_translation("x", "en", "xx", &body).unwrap_err();
        assert!(err.to_string().contains("invalid language pair"));
    }

    #[test]
    fn test_parse_translation_missing_text() {
        let body = json!({ "responseStatus": 200, "responseData": {} });
        let err = TranslatorTool::parse_translation("x", "en", "es", &body).unwrap_err();
        assert!(matches!(err, HandlerError::Upstream { .. }));
    }

    #[test]
    fn test_list_languages() {
        let payload = TranslatorTool::list_languages();
        assert_eq!(payload["count"], LANGUAGES.len());
        assert!(
            payload["languages"]
                .as_array()
                .unwrap()
                .iter()
                .any(|l| l["code"] == "es" && l["name"] == "Spanish")
        );
    }

    #[tokio::test]
    async fn test_execute_missing_text() {
        let tool = TranslatorTool::new().unwrap();
        let err = tool.execute("translate", &json!({})).await.unwrap_err();
        assert!(err.to_string().contains("no text provided"));
    }

    #[tokio::test]
    async fn test_execute_languages() {
        let tool = TranslatorTool::new().unwrap();
        let payload = tool.execute("languages", &json!({})).await.unwrap();
        assert_eq!(payload["action"], "languages");
    }

    #[tokio::test]
    async fn test_unknown_action() {
        let tool = TranslatorTool::new().unwrap();
        let err = tool.execute("conjugate", &json!({})).await.unwrap_err();
        assert!(matches!(err, HandlerError::UnknownAction { .. }));
    }
}
