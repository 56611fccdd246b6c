use base64::{
    engine::general_purpose::{STANDARD as BASE64, URL_SAFE_NO_PAD as BASE64_URL},
    Engine,
};
use url::Url;

use crate::error::{Error, Result};
use crate::models::quiz::Quiz;

pub const SHARE_PARAM: &str = "share";

/// Share tokens carry a whole quiz: canonical JSON, its UTF-8 bytes as
/// standard base64, and that text again as URL-safe unpadded base64.
pub struct ShareService;

impl ShareService {
    pub fn encode(quiz: &Quiz) -> Result<String> {
        let json = serde_json::to_string(quiz)?;
        let binary_safe = BASE64.encode(json.as_bytes());
        Ok(BASE64_URL.encode(binary_safe.as_bytes()))
    }

    pub fn decode(token: &str) -> Result<Quiz> {
        let outer = BASE64_URL
            .decode(token.trim().as_bytes())
            .map_err(|e| Error::CorruptShareLink(format!("outer encoding: {}", e)))?;
        let binary_safe = String::from_utf8(outer)
            .map_err(|_| Error::CorruptShareLink("outer payload is not text".to_string()))?;
        let utf8 = BASE64
            .decode(binary_safe.as_bytes())
            .map_err(|e| Error::CorruptShareLink(format!("inner encoding: {}", e)))?;
        let json = String::from_utf8(utf8)
            .map_err(|_| Error::CorruptShareLink("payload is not valid UTF-8".to_string()))?;
        let quiz: Quiz = serde_json::from_str(&json)
            .map_err(|e| Error::CorruptShareLink(format!("payload is not a quiz: {}", e)))?;

        if quiz.id.trim().is_empty() {
            return Err(Error::CorruptShareLink("quiz id is empty".to_string()));
        }
        Ok(quiz)
    }

    /// `{base}/#/quiz/{id}?share={token}`; the query sits inside the fragment
    /// because the front end routes on the hash.
    pub fn share_url(base_url: &str, quiz: &Quiz) -> Result<String> {
        let token = Self::encode(quiz)?;
        let base = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid SHARE_BASE_URL {}: {}", base_url, e)))?;
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair(SHARE_PARAM, &token)
            .finish();
        let mut url = base;
        url.set_fragment(Some(&format!("/quiz/{}?{}", quiz.id, query)));
        Ok(url.to_string())
    }
}
