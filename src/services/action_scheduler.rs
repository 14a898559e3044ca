//! Wave-based parallel action scheduler.
//!
//! Actions are dispatched in waves: every pending action whose dependencies
//! have all *completed* runs concurrently, and the next wave is computed only
//! after the whole current wave has settled.
//!
//! Dependency semantics are completion, not success: an action whose
//! dependency failed still runs. Whether dependents should instead be skipped
//! is an open question; see DESIGN.md before changing it.
//!
//! In-flight agent invocations are never cancelled or timed out here; a wave
//! always runs to completion (success or captured failure).

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::models::{
    Action, ActionResult, AgentRequest, AgentResponse, DeadlockInfo, ExecutionReport,
    SchedulerConfig,
};
use crate::domain::ports::{AgentCapability, AgentResolver};
use crate::services::action_graph::ActionGraph;

/// Event emitted during execution.
#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum SchedulerEvent {
    /// Execution started.
    Started {
        /// Actions submitted.
        total_actions: usize,
    },
    /// Wave dispatched.
    WaveStarted {
        /// 1-based wave number.
        wave: usize,
        /// Ids in submission order.
        action_ids: Vec<Uuid>,
    },
    /// An action settled.
    ActionCompleted {
        /// Wave it ran in.
        wave: usize,
        /// Its result.
        result: ActionResult,
    },
    /// Every action in the wave settled.
    WaveCompleted {
        /// 1-based wave number.
        wave: usize,
        /// Successful actions.
        succeeded: usize,
        /// Failed actions.
        failed: usize,
    },
    /// No pending action can ever become runnable.
    Deadlock(DeadlockInfo),
    /// Execution finished (normally or on deadlock).
    Finished {
        /// Waves dispatched.
        waves: usize,
        /// Successful actions.
        succeeded: usize,
        /// Failed actions.
        failed: usize,
        /// Actions never dispatched.
        unexecuted: usize,
    },
}

/// A wave slot: either settled immediately or running on the runtime.
enum WaveEntry {
    Settled(ActionResult),
    Running(Action, JoinHandle<ActionResult>),
}

/// Executes action graphs against agent capabilities.
#[derive(Debug, Clone, Default)]
pub struct ActionScheduler {
    config: SchedulerConfig,
    graph: ActionGraph,
}

impl ActionScheduler {
    /// Create a scheduler with the given concurrency settings.
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            graph: ActionGraph::new(),
        }
    }

    /// Create a scheduler with default settings.
    pub fn with_defaults() -> Self {
        Self::new(SchedulerConfig::default())
    }

    /// Execute a set of actions in dependency waves.
    ///
    /// Returns one result per executed action. On deadlock the report holds
    /// the results gathered so far and lists the remaining ids as unexecuted;
    /// no error is raised.
    pub async fn execute_parallel(
        &self,
        actions: Vec<Action>,
        resolver: &dyn AgentResolver,
    ) -> ExecutionReport {
        // No listener: with the receiver gone every send fails at once.
        let (tx, _) = mpsc::channel(1);
        self.execute_with_events(actions, resolver, tx).await
    }

    /// Execute with event streaming.
    ///
    /// Sends wait for channel capacity, so the receiver must be drained
    /// concurrently (or dropped) for large graphs.
    pub async fn execute_with_events(
        &self,
        actions: Vec<Action>,
        resolver: &dyn AgentResolver,
        event_tx: mpsc::Sender<SchedulerEvent>,
    ) -> ExecutionReport {
        let start_time = Instant::now();
        let mut report = ExecutionReport::default();
        let mut completed: HashSet<Uuid> = HashSet::new();
        let mut pending = actions;

        info!(total_actions = pending.len(), "Starting parallel action execution");
        let _ = event_tx
            .send(SchedulerEvent::Started {
                total_actions: pending.len(),
            })
            .await;

        while !pending.is_empty() {
            let (mut runnable, blocked): (Vec<Action>, Vec<Action>) = std::mem::take(&mut pending)
                .into_iter()
                .partition(|action| action.is_runnable(&completed));

            if runnable.is_empty() {
                let cycle = self.graph.detect_cycle(&blocked);
                let pending_ids: Vec<Uuid> = blocked.iter().map(|a| a.id).collect();
                warn!(
                    pending = pending_ids.len(),
                    cycle = ?cycle,
                    "Scheduler deadlock: no pending action can become runnable"
                );
                let info = DeadlockInfo {
                    pending: pending_ids.clone(),
                    cycle,
                };
                let _ = event_tx.send(SchedulerEvent::Deadlock(info.clone())).await;
                report.unexecuted = pending_ids;
                report.deadlock = Some(info);
                break;
            }
            pending = blocked;

            let wave = report.waves.len() + 1;
            let wave_ids: Vec<Uuid> = runnable.iter().map(|a| a.id).collect();
            // Stable sort: equal priorities keep submission order.
            runnable.sort_by(|a, b| b.priority.cmp(&a.priority));

            debug!(wave, actions = runnable.len(), "Dispatching wave");
            let _ = event_tx
                .send(SchedulerEvent::WaveStarted {
                    wave,
                    action_ids: wave_ids.clone(),
                })
                .await;

            let mut results = self.execute_wave(&runnable, resolver, wave).await;
            // Report in submission order regardless of dispatch order.
            results.sort_by_key(|r| wave_ids.iter().position(|id| *id == r.action_id));

            let mut succeeded = 0;
            let mut failed = 0;
            for result in &results {
                if result.success() {
                    succeeded += 1;
                } else {
                    failed += 1;
                }
                let _ = event_tx
                    .send(SchedulerEvent::ActionCompleted {
                        wave,
                        result: result.clone(),
                    })
                    .await;
            }

            // Completion, not success: failed actions still unblock dependents.
            completed.extend(wave_ids.iter().copied());
            report.waves.push(wave_ids);
            report.results.extend(results);

            debug!(wave, succeeded, failed, "Wave settled");
            let _ = event_tx
                .send(SchedulerEvent::WaveCompleted {
                    wave,
                    succeeded,
                    failed,
                })
                .await;
        }

        report.total_duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            waves = report.wave_count(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            unexecuted = report.unexecuted.len(),
            duration_ms = report.total_duration_ms,
            "Parallel action execution finished"
        );
        let _ = event_tx
            .send(SchedulerEvent::Finished {
                waves: report.wave_count(),
                succeeded: report.succeeded(),
                failed: report.failed(),
                unexecuted: report.unexecuted.len(),
            })
            .await;

        report
    }

    /// Run one wave to completion and return its results in dispatch order.
    async fn execute_wave(
        &self,
        wave_actions: &[Action],
        resolver: &dyn AgentResolver,
        wave: usize,
    ) -> Vec<ActionResult> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let mut entries = Vec::with_capacity(wave_actions.len());

        for action in wave_actions {
            let Some(capability) = resolver.resolve(action.role) else {
                warn!(
                    action_id = %action.id,
                    role = %action.role,
                    "No agent capability registered for role"
                );
                entries.push(WaveEntry::Settled(ActionResult::failed(
                    action,
                    format!("No agent capability registered for role {}", action.role),
                    0,
                    wave,
                )));
                continue;
            };

            let semaphore = Arc::clone(&semaphore);
            let task_action = action.clone();
            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                run_action(&task_action, capability, wave).await
            });
            entries.push(WaveEntry::Running(action.clone(), handle));
        }

        let mut results = Vec::with_capacity(entries.len());
        for entry in entries {
            let result = match entry {
                WaveEntry::Settled(result) => result,
                WaveEntry::Running(action, handle) => match handle.await {
                    Ok(result) => result,
                    Err(join_error) => {
                        warn!(
                            action_id = %action.id,
                            role = %action.role,
                            error = %join_error,
                            "Agent task aborted"
                        );
                        ActionResult::failed(
                            &action,
                            format!("Agent task aborted: {join_error}"),
                            0,
                            wave,
                        )
                    }
                },
            };
            results.push(result);
        }

        results
    }
}

/// Build the request sent to an action's agent.
fn request_for(action: &Action) -> AgentRequest {
    AgentRequest::new(action.role, action.kind.as_str()).with_context(action.context.clone())
}

/// Invoke a capability for a single action, capturing any failure.
async fn run_action(
    action: &Action,
    capability: Arc<dyn AgentCapability>,
    wave: usize,
) -> ActionResult {
    let start = Instant::now();
    debug!(
        action_id = %action.id,
        role = %action.role,
        kind = %action.kind,
        agent = capability.name(),
        "Invoking agent"
    );

    let outcome = capability
        .invoke(request_for(action))
        .await
        .and_then(AgentResponse::validate);
    let duration_ms = start.elapsed().as_millis() as u64;

    match outcome {
        Ok(response) => ActionResult::completed(action, response, duration_ms, wave),
        Err(err) => {
            warn!(
                action_id = %action.id,
                role = %action.role,
                error = %err,
                "Action failed"
            );
            ActionResult::failed(action, err.to_string(), duration_ms, wave)
        }
    }
}
