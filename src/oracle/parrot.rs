use super::Suggest;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Offline oracle that replays a script, then goes silent.
///
/// The deterministic stand-in for the suggestion service: tests feed it
/// good moves, garbage, or nothing at all to force every fallback path
/// without touching the network.
#[derive(Default)]
pub struct Parrot {
    replies: Mutex<VecDeque<String>>,
}

impl Parrot {
    pub fn say(lines: &[&str]) -> Self {
        Self {
            replies: Mutex::new(lines.iter().map(|s| s.to_string()).collect()),
        }
    }

    /// a parrot that never answers, timing out every suggestion
    pub fn mute() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Suggest for Parrot {
    async fn suggest(&self, _prompt: &str) -> anyhow::Result<String> {
        self.replies
            .lock()
            .expect("parrot mutex")
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("suggestion timed out"))
    }
}
