//! The block listener service.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use futures::future::join_all;
use tracing::{debug, error, info, trace, warn};
use wf_bus::{MessageBus, MessageEventKind};
use wf_protocol::MessageCodec;
use wf_state::{BlockDepthEntry, QueueName, StateStore};

use crate::config::ListenerConfig;
use crate::domain::cursor::{determine_starting_block, SyncState};
use crate::domain::errors::ListenerError;
use crate::ports::{ChainRpc, RpcError};
use crate::IMMEDIATE_RESCHEDULE_MILLIS;

/// Result of one listener iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationOutcome {
    /// The processing window is not exhausted; reschedule immediately.
    MoreWork,
    /// Caught up with the chain; reschedule after the normal interval.
    Idle,
}

/// Per-chain block listener.
///
/// One instance owns the sync state of one chain. It is driven either by
/// [`BlockListener::run`] as a long-lived task or iteration by iteration
/// in tests.
pub struct BlockListener<R: ChainRpc> {
    config: ListenerConfig,
    rpc: Arc<R>,
    codec: Arc<dyn MessageCodec>,
    state: Arc<StateStore>,
    rx_bus: Arc<MessageBus>,
    sync: SyncState,
}

impl<R: ChainRpc> BlockListener<R> {
    /// Create a listener over a chain node.
    #[must_use]
    pub fn new(
        config: ListenerConfig,
        rpc: Arc<R>,
        codec: Arc<dyn MessageCodec>,
        state: Arc<StateStore>,
        rx_bus: Arc<MessageBus>,
    ) -> Self {
        Self {
            config,
            rpc,
            codec,
            state,
            rx_bus,
            sync: SyncState::default(),
        }
    }

    /// The current sync state; test and diagnostics hook.
    #[must_use]
    pub fn sync_state(&self) -> &SyncState {
        &self.sync
    }

    async fn with_timeout<T>(
        &self,
        call: impl std::future::Future<Output = Result<T, RpcError>>,
    ) -> Result<T, ListenerError> {
        match tokio::time::timeout(self.config.rpc_timeout(), call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(ListenerError::Transient(e.to_string())),
            Err(_) => Err(ListenerError::Transient(format!(
                "rpc timeout after {:?}",
                self.config.rpc_timeout()
            ))),
        }
    }

    /// Place the cursor from chain head, stored state and configuration.
    ///
    /// # Errors
    ///
    /// Returns a transient error when the node cannot be queried.
    pub async fn initialise(&mut self) -> Result<(), ListenerError> {
        let highest = self.with_timeout(self.rpc.get_highest_block()).await?;
        let chain_state = self
            .state
            .get_blockchain_data(&self.config.blockchain)
            .unwrap_or_default();

        let start = determine_starting_block(
            highest,
            chain_state.status.current_block,
            self.config.starting_block,
            self.config.restart_depth,
        );
        self.sync.cursor = start;
        self.sync.discovered_highest = highest;

        info!(
            blockchain = self.config.blockchain.as_str(),
            highest,
            starting_block = start,
            "listener initialised"
        );
        self.save_node_status(Some(start)).await?;
        Ok(())
    }

    /// Run forever: initialise, then iterate on the configured schedule.
    pub async fn run(mut self) {
        loop {
            match self.initialise().await {
                Ok(()) => break,
                Err(e) => {
                    error!(
                        blockchain = self.config.blockchain.as_str(),
                        error = %e,
                        "listener initialisation failed, retrying"
                    );
                    tokio::time::sleep(self.config.interval()).await;
                }
            }
        }

        let mut delay = self.config.interval();
        loop {
            tokio::time::sleep(delay).await;
            delay = match self.run_iteration().await {
                Ok(IterationOutcome::MoreWork) => {
                    std::time::Duration::from_millis(IMMEDIATE_RESCHEDULE_MILLIS)
                }
                Ok(IterationOutcome::Idle) => self.config.interval(),
                Err(e) => {
                    warn!(
                        blockchain = self.config.blockchain.as_str(),
                        retry_count = self.sync.retry_count,
                        error = %e,
                        "iteration failed, rescheduling"
                    );
                    self.config.interval()
                }
            };
        }
    }

    /// One iteration: discover the head, process at most one batch.
    ///
    /// # Errors
    ///
    /// Returns a transient error when the batch failed and is still within
    /// its retry budget; the cursor does not move in that case.
    pub async fn run_iteration(&mut self) -> Result<IterationOutcome, ListenerError> {
        self.sync.iteration += 1;

        let highest = self.with_timeout(self.rpc.get_highest_block()).await?;
        self.sync.discovered_highest = highest;
        if highest == 0 {
            return Ok(IterationOutcome::Idle);
        }

        // The head block may still be contested; stay one behind it.
        let head_bound = highest - 1;
        let end_block = if self.config.end_block > 0 {
            self.config.end_block.min(head_bound)
        } else {
            head_bound
        };
        self.sync.end_block = end_block;

        if self.sync.cursor >= end_block {
            return Ok(IterationOutcome::Idle);
        }

        let batch_start = self.sync.cursor + 1;
        let batch_end = end_block.min(self.sync.cursor + self.config.batch_size);

        let results = join_all(
            (batch_start..=batch_end).map(|number| self.process_block(number)),
        )
        .await;

        let mut tracked = Vec::new();
        let mut batch_error = None;
        for result in results {
            match result {
                Ok(mut extracted) => tracked.append(&mut extracted),
                Err(e) => batch_error = Some(e),
            }
        }

        if let Some(error) = batch_error {
            self.sync.retry_count += 1;
            if self.config.max_retries > 0 && self.sync.retry_count > self.config.max_retries {
                let skipped = batch_end - self.sync.cursor;
                warn!(
                    blockchain = self.config.blockchain.as_str(),
                    from = batch_start,
                    to = batch_end,
                    error = %error,
                    "retries exhausted, skipping batch"
                );
                self.sync.skipped_blocks += skipped;
                self.sync.retry_count = 0;
                self.sync.cursor = batch_end;
                self.save_node_status(None).await?;
                return Ok(self.outcome_after(batch_end, end_block));
            }
            return Err(error);
        }

        let advanced = batch_end - self.sync.cursor;
        self.sync.retry_count = 0;
        self.sync.cursor = batch_end;

        debug!(
            blockchain = self.config.blockchain.as_str(),
            from = batch_start,
            to = batch_end,
            messages = tracked.len(),
            "batch processed"
        );

        self.track_block_depths(advanced, &tracked).await?;
        self.save_node_status(None).await?;
        Ok(self.outcome_after(batch_end, end_block))
    }

    fn outcome_after(&self, batch_end: u64, end_block: u64) -> IterationOutcome {
        if batch_end < end_block {
            IterationOutcome::MoreWork
        } else {
            IterationOutcome::Idle
        }
    }

    /// Fetch one block and extract every Whiteflag message it carries.
    ///
    /// Returns the transaction hash and block number of each extracted
    /// message, for confirmation tracking.
    async fn process_block(&self, number: u64) -> Result<Vec<(String, u64)>, ListenerError> {
        let block = self
            .with_timeout(self.rpc.get_block_by_number(number, true))
            .await?;

        if self.config.trace_raw {
            trace!(blockchain = self.config.blockchain.as_str(), block = ?block, "raw block");
        }

        let block_time: Option<DateTime<Utc>> = block
            .block_time_millis()
            .and_then(|millis| Utc.timestamp_millis_opt(millis as i64).single());

        let mut extracted = Vec::new();
        for element in block.elements.iter().filter(|e| e.is_candidate()) {
            match self.codec.extract_message(element, number, block_time) {
                Ok(message) => {
                    debug!(
                        blockchain = self.config.blockchain.as_str(),
                        block = number,
                        transaction = element.hash.as_str(),
                        code = %message.message_header.message_code,
                        "whiteflag message received"
                    );
                    extracted.push((element.hash.clone(), number));
                    self.rx_bus.emit(MessageEventKind::MessageReceived, message);
                }
                Err(e) if e.is_no_data() => {}
                Err(e) => return Err(ListenerError::Codec(e.to_string())),
            }
        }
        Ok(extracted)
    }

    /// Advance confirmation bookkeeping: deepen known entries, admit the
    /// newly observed ones, drop everything past the threshold.
    async fn track_block_depths(
        &self,
        advanced: u64,
        new_entries: &[(String, u64)],
    ) -> Result<(), ListenerError> {
        let existing = self.state.get_queue(QueueName::BlockDepths);
        for item in existing {
            let Ok(mut entry) = serde_json::from_value::<BlockDepthEntry>(item) else {
                continue;
            };
            if entry.blockchain != self.config.blockchain {
                continue;
            }
            entry.block_depth += advanced;
            if entry.block_depth >= self.config.confirmation_depth {
                debug!(
                    transaction = entry.transaction_hash.as_str(),
                    depth = entry.block_depth,
                    "transaction confirmed"
                );
                self.state
                    .remove_queue_data(
                        QueueName::BlockDepths,
                        "transactionHash",
                        &entry.transaction_hash,
                    )
                    .await?;
            } else {
                self.state
                    .upsert_queue_data(
                        QueueName::BlockDepths,
                        "transactionHash",
                        serde_json::to_value(&entry).unwrap_or_default(),
                    )
                    .await?;
            }
        }

        for (hash, block_number) in new_entries {
            let depth = self.sync.cursor.saturating_sub(*block_number);
            if depth >= self.config.confirmation_depth {
                continue;
            }
            let entry = BlockDepthEntry {
                transaction_hash: hash.clone(),
                blockchain: self.config.blockchain.clone(),
                block_depth: depth,
            };
            self.state
                .upsert_queue_data(
                    QueueName::BlockDepths,
                    "transactionHash",
                    serde_json::to_value(&entry).unwrap_or_default(),
                )
                .await?;
        }
        Ok(())
    }

    /// Persist the sync status into the chain state.
    async fn save_node_status(&self, starting_block: Option<u64>) -> Result<(), ListenerError> {
        let mut chain_state = self
            .state
            .get_blockchain_data(&self.config.blockchain)
            .unwrap_or_default();

        if let Some(start) = starting_block {
            chain_state.status.starting_block = start;
        }
        chain_state.status.current_block = self.sync.cursor;
        chain_state.status.highest_block = self.sync.discovered_highest;
        chain_state.status.syncing =
            self.sync.cursor + 1 < self.sync.discovered_highest;
        chain_state.status.updated = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        if self.config.trace_raw {
            trace!(
                blockchain = self.config.blockchain.as_str(),
                parameters = ?chain_state.parameters,
                "node status saved"
            );
        }

        self.state
            .update_blockchain_data(&self.config.blockchain, chain_state)
            .await?;
        Ok(())
    }
}
