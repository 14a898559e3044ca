//! Mock agent capability and fix generator for testing.

use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::domain::errors::AgentError;
use crate::domain::models::{AgentRequest, AgentResponse, AgentRole, FixRequest, GeneratedFix};
use crate::domain::ports::{AgentCapability, FixGenerator};

/// Mock reply configuration.
#[derive(Debug, Clone)]
pub struct MockReply {
    /// What the agent returns
    pub result: Result<AgentResponse, AgentError>,
    /// Simulated latency
    pub delay: Duration,
}

impl Default for MockReply {
    fn default() -> Self {
        Self {
            result: Ok(AgentResponse::new("Mock contribution.", 0.9)
                .with_structured_output(json!({ "mock": true }))),
            delay: Duration::ZERO,
        }
    }
}

impl MockReply {
    /// Reply with `response`.
    pub fn success(response: AgentResponse) -> Self {
        Self {
            result: Ok(response),
            ..Default::default()
        }
    }

    /// Fail with `error`.
    pub fn failure(error: AgentError) -> Self {
        Self {
            result: Err(error),
            ..Default::default()
        }
    }

    /// A successful reply with the given confidence.
    pub fn confident(confidence: f64) -> Self {
        Self::success(
            AgentResponse::new("Mock contribution.", confidence)
                .with_structured_output(json!({ "confidence": confidence })),
        )
    }

    /// Sleep before replying.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock agent for testing.
///
/// Replies are chosen in order: the role's queued replies, then the role's
/// standing reply, then the default reply.
#[derive(Debug, Default)]
pub struct MockAgent {
    default_reply: MockReply,
    role_replies: Mutex<HashMap<AgentRole, MockReply>>,
    queued: Mutex<HashMap<AgentRole, VecDeque<MockReply>>>,
    requests: Mutex<Vec<AgentRequest>>,
    invocations: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockAgent {
    /// Agent replying with the default reply.
    pub fn new() -> Self {
        Self::default()
    }

    /// Agent replying with `reply` unless overridden.
    pub fn with_default_reply(reply: MockReply) -> Self {
        Self {
            default_reply: reply,
            ..Default::default()
        }
    }

    /// Standing reply for every request from `role`.
    pub fn set_reply_for_role(&self, role: AgentRole, reply: MockReply) {
        lock(&self.role_replies).insert(role, reply);
    }

    /// One-shot reply for the next request from `role`.
    pub fn push_reply(&self, role: AgentRole, reply: MockReply) {
        lock(&self.queued).entry(role).or_default().push_back(reply);
    }

    /// Number of invocations so far.
    pub fn invocation_count(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    /// Highest number of concurrent invocations observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Every request received, in arrival order.
    pub fn requests(&self) -> Vec<AgentRequest> {
        lock(&self.requests).clone()
    }

    fn next_reply(&self, role: AgentRole) -> MockReply {
        if let Some(reply) = lock(&self.queued).get_mut(&role).and_then(VecDeque::pop_front) {
            return reply;
        }
        lock(&self.role_replies)
            .get(&role)
            .cloned()
            .unwrap_or_else(|| self.default_reply.clone())
    }
}

#[async_trait]
impl AgentCapability for MockAgent {
    fn name(&self) -> &str {
        "mock"
    }

    async fn invoke(&self, request: AgentRequest) -> Result<AgentResponse, AgentError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        let reply = self.next_reply(request.role);
        lock(&self.requests).push(request);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        } else {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        reply.result
    }
}

/// Mock fix generator for testing.
///
/// Returns queued results in order, then the fallback result.
#[derive(Debug)]
pub struct MockFixGenerator {
    queued: Mutex<VecDeque<Result<GeneratedFix, AgentError>>>,
    fallback: Result<GeneratedFix, AgentError>,
    requests: Mutex<Vec<FixRequest>>,
}

impl MockFixGenerator {
    /// Always answer with `code`.
    pub fn fixing_to(code: impl Into<String>) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            fallback: Ok(GeneratedFix {
                code: code.into(),
                explanation: Some("Mock fix".to_string()),
                tokens_used: 100,
            }),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always fail with `error`.
    pub fn failing(error: AgentError) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            fallback: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a result for the next request.
    pub fn push_result(&self, result: Result<GeneratedFix, AgentError>) {
        lock(&self.queued).push_back(result);
    }

    /// Every request received, in arrival order.
    pub fn requests(&self) -> Vec<FixRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl FixGenerator for MockFixGenerator {
    async fn generate_fix(&self, request: FixRequest) -> Result<GeneratedFix, AgentError> {
        lock(&self.requests).push(request);
        lock(&self.queued)
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}
