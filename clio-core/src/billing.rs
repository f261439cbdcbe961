use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use clio_protocol::Metrics;

/// One completed request's contribution to the billing tally
/// (`spec.md` §3, Billing).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BilledRequest {
    pub model: String,
    pub multiplier: f64,
    pub tokens: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quota {
    pub entitlement: u64,
    pub used: u64,
    pub available: u64,
    pub percent_remaining: f64,
    pub reset_date: Option<DateTime<Utc>>,
}

impl Default for Quota {
    fn default() -> Self {
        Self {
            entitlement: 0,
            used: 0,
            available: 0,
            percent_remaining: 100.0,
            reset_date: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Billing {
    pub model_id: String,
    pub total_tokens: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub requests: Vec<BilledRequest>,
    /// Count of premium requests charged this session. The user-collaboration
    /// sub-protocol must never increment this on its own (`spec.md` §4.6/P11).
    pub premium_requests_charged: u64,
    pub quota: Quota,
}

impl Billing {
    /// Record the outcome of one real provider request.
    pub fn record_request(&mut self, model: &str, metrics: &Metrics) {
        self.model_id = model.to_string();
        self.total_tokens += metrics.total_tokens;
        self.prompt_tokens += metrics.prompt_tokens;
        self.completion_tokens += metrics.completion_tokens;
        self.requests.push(BilledRequest {
            model: model.to_string(),
            multiplier: metrics.multiplier,
            tokens: metrics.total_tokens,
        });
        if metrics.multiplier != 0.0 {
            self.premium_requests_charged += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collaboration_turns_never_charge_premium() {
        // A collaboration answer is threaded back in as a tool-result on the
        // *next* real request; it never calls `record_request` by itself.
        let billing = Billing::default();
        assert_eq!(billing.premium_requests_charged, 0);
    }

    #[test]
    fn zero_multiplier_does_not_count_as_premium() {
        let mut billing = Billing::default();
        billing.record_request(
            "local-model",
            &Metrics {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
                multiplier: 0.0,
            },
        );
        assert_eq!(billing.premium_requests_charged, 0);
        assert_eq!(billing.total_tokens, 15);
    }
}
