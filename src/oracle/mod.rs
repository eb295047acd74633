pub mod parrot;
pub use parrot::*;

pub mod prompt;
pub use prompt::*;

use anyhow::Context;

/// A move-suggestion service: text prompt in, short text token out.
///
/// Treated as unreliable by contract; it can time out, return garbage, or
/// suggest something illegal. Whoever consumes a suggestion validates it
/// against the legal set and falls back deterministically.
#[async_trait::async_trait]
pub trait Suggest: Send + Sync {
    async fn suggest(&self, prompt: &str) -> anyhow::Result<String>;
}

/// HTTP client for an external text-generation endpoint.
pub struct Oracle {
    url: String,
    web: reqwest::Client,
}

#[derive(serde::Serialize)]
struct Ask<'a> {
    prompt: &'a str,
}

impl Oracle {
    pub fn new(url: impl Into<String>) -> anyhow::Result<Self> {
        let web = reqwest::Client::builder()
            .timeout(crate::ORACLE_TIMEOUT)
            .build()
            .context("build oracle client")?;
        Ok(Self {
            url: url.into(),
            web,
        })
    }
}

#[async_trait::async_trait]
impl Suggest for Oracle {
    async fn suggest(&self, prompt: &str) -> anyhow::Result<String> {
        let reply = self
            .web
            .post(&self.url)
            .json(&Ask { prompt })
            .send()
            .await
            .context("oracle request")?
            .error_for_status()
            .context("oracle request")?
            .json::<serde_json::Value>()
            .await
            .context("oracle reply decode")?;
        // the service is unreliable by contract; accept {"text": ...} or a
        // bare string and let the caller's exact-match validation do the rest
        reply
            .get("text")
            .and_then(|t| t.as_str())
            .or_else(|| reply.as_str())
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("oracle reply carried no text: {}", reply))
    }
}
