use std::io::BufRead;
use std::io::BufReader;
use std::time::Duration;

use clio_protocol::Metrics;
use clio_protocol::ModelEvent;
use clio_protocol::ThinkingSignal;
use serde::Deserialize;

use crate::provider::AgentOutcome;
use crate::provider::ModelAgent;
use crate::provider::RequestOptions;
use crate::provider::Ui;

/// Generic event shape read off the wire. Deliberately provider-agnostic
/// (`spec.md` §1 Non-goals: no provider-specific wire format is assumed) —
/// a concrete provider integration adapts its own SSE payloads into this
/// shape before handing them to [`HttpModelAgent`], or implements
/// [`ModelAgent`] directly.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireEvent {
    Chunk { delta: String },
    Thinking {
        delta: String,
        #[serde(default)]
        signal: Option<String>,
    },
    ToolCall { name: String },
    SystemMessage { message: String },
    Done {
        #[serde(default)]
        prompt_tokens: u64,
        #[serde(default)]
        completion_tokens: u64,
        #[serde(default)]
        multiplier: f64,
    },
}

/// A minimal blocking HTTP/SSE model agent. It performs one streaming
/// request per turn and folds the response into [`ModelEvent`]s; it does
/// not itself loop tool calls back into further provider requests — that
/// iteration belongs to the external workflow orchestrator (`spec.md` §1,
/// §9) and is expected to wrap this client.
pub struct HttpModelAgent {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl HttpModelAgent {
    pub fn new(base_url: String, model: String, api_key: Option<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());
        Self {
            client,
            base_url,
            model,
            api_key,
        }
    }
}

impl ModelAgent for HttpModelAgent {
    fn process_user_request(
        &mut self,
        input: &str,
        _options: RequestOptions<'_>,
        ui: &mut dyn Ui,
        on_event: &mut dyn FnMut(ModelEvent),
    ) -> AgentOutcome {
        ui.start_spinner();
        let mut request = self
            .client
            .post(format!("{}/v1/chat/stream", self.base_url.trim_end_matches('/')))
            .json(&serde_json::json!({ "model": self.model, "input": input, "stream": true }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = match request.send() {
            Ok(resp) => resp,
            Err(err) => {
                return AgentOutcome {
                    success: false,
                    error: Some(format!("request failed: {err}")),
                    ..Default::default()
                };
            }
        };

        if let Err(err) = response.error_for_status_ref() {
            return AgentOutcome {
                success: false,
                error: Some(err.to_string()),
                ..Default::default()
            };
        }

        let mut accumulated = String::new();
        let mut final_metrics = Metrics::default();
        let mut interrupted = false;
        let reader = BufReader::new(response);
        let mut lines = reader.lines();

        // `spec.md` §5: a SIGALRM fires every second purely to break this
        // blocking read so a pending SIGINT can be delivered; it is
        // re-armed each time it interrupts a read, and disarmed on every
        // exit path below.
        ui.arm_turn_alarm();
        'read: loop {
            if ui.check_interrupted() {
                interrupted = true;
                break 'read;
            }
            let line = match lines.next() {
                None => break 'read,
                Some(Ok(line)) => line,
                Some(Err(err)) if err.kind() == std::io::ErrorKind::Interrupted => {
                    ui.arm_turn_alarm();
                    continue 'read;
                }
                Some(Err(err)) => {
                    ui.disarm_turn_alarm();
                    return AgentOutcome {
                        success: false,
                        error: Some(format!("stream read failed: {err}")),
                        ..Default::default()
                    };
                }
            };
            let Some(payload) = line.strip_prefix("data: ") else {
                continue 'read;
            };
            if payload == "[DONE]" {
                break 'read;
            }
            let Ok(event) = serde_json::from_str::<WireEvent>(payload) else {
                continue 'read;
            };
            match event {
                WireEvent::Chunk { delta } => {
                    accumulated.push_str(&delta);
                    on_event(ModelEvent::Chunk {
                        delta,
                        metrics: None,
                    });
                }
                WireEvent::Thinking { delta, signal } => {
                    let signal = match signal.as_deref() {
                        Some("start") => Some(ThinkingSignal::Start),
                        Some("end") => Some(ThinkingSignal::End),
                        _ => None,
                    };
                    on_event(ModelEvent::Thinking { delta, signal });
                }
                WireEvent::ToolCall { name } => {
                    on_event(ModelEvent::ToolCall { name });
                }
                WireEvent::SystemMessage { message } => {
                    on_event(ModelEvent::SystemMessage { message });
                }
                WireEvent::Done {
                    prompt_tokens,
                    completion_tokens,
                    multiplier,
                } => {
                    final_metrics = Metrics {
                        prompt_tokens,
                        completion_tokens,
                        total_tokens: prompt_tokens + completion_tokens,
                        multiplier,
                    };
                    on_event(ModelEvent::Done {
                        metrics: final_metrics.clone(),
                    });
                }
            }
        }
        ui.disarm_turn_alarm();

        AgentOutcome {
            success: !interrupted,
            final_response: Some(accumulated),
            error: None,
            metrics: Some(final_metrics),
            messages_saved_during_workflow: false,
            interrupted,
        }
    }
}
