use serde::Deserialize;
use serde::Serialize;

/// Token/billing metrics attached to a chunk or the end of a turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    /// Billing multiplier for the model used this turn: 0 for a
    /// non-premium/local model, otherwise an integer or decimal factor
    /// applied to the premium-request counter.
    #[serde(default)]
    pub multiplier: f64,
}

impl Metrics {
    pub fn merge(&mut self, other: &Metrics) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
        if other.multiplier != 0.0 {
            self.multiplier = other.multiplier;
        }
    }
}
