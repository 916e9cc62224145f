//! Gateway assembly.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;
use wf_auth::{AuthenticationService, SignatureFetcher};
use wf_bus::Buses;
use wf_listener::{BlockListener, ChainRpc, ListenerConfig};
use wf_management::{ManagementService, MessageRetriever};
use wf_protocol::MessageCodec;
use wf_state::{Datastore, StateError, StateStore};

use crate::config::GatewayConfig;
use crate::pipeline;

/// The assembled gateway core.
pub struct Gateway {
    config: GatewayConfig,
    /// The protocol state store.
    pub state: Arc<StateStore>,
    /// The rx/tx streams.
    pub buses: Buses,
    /// The authentication plane.
    pub auth: Arc<AuthenticationService>,
    /// The management plane.
    pub management: Arc<ManagementService>,
    tasks: Vec<JoinHandle<()>>,
}

impl Gateway {
    /// Assemble the subsystems over their collaborators.
    ///
    /// # Errors
    ///
    /// `StateError::Fatal` for an unusable master key.
    pub fn new(
        config: GatewayConfig,
        datastore: Arc<dyn Datastore>,
        fetcher: Arc<dyn SignatureFetcher>,
        retriever: Arc<dyn MessageRetriever>,
    ) -> Result<Self, StateError> {
        let state = Arc::new(StateStore::new(config.state.clone(), datastore)?);
        let buses = Buses::new();
        let auth = Arc::new(AuthenticationService::new(
            config.auth.clone(),
            state.clone(),
            fetcher,
        ));
        let management = Arc::new(ManagementService::new(
            config.management.clone(),
            state.clone(),
            buses.clone(),
            auth.clone(),
            retriever,
        ));
        Ok(Self {
            config,
            state,
            buses,
            auth,
            management,
            tasks: Vec::new(),
        })
    }

    /// The loaded configuration.
    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Load the state and start the management plane and stream bridges.
    ///
    /// # Errors
    ///
    /// Propagates a fatal state load.
    pub async fn start(&mut self) -> Result<(), StateError> {
        self.state.init_state().await?;
        self.tasks.extend(self.management.spawn());
        self.tasks.extend(pipeline::spawn_bridges(&self.buses));
        info!("gateway core started");
        Ok(())
    }

    /// Spawn a listener for one chain over its wire client and codec.
    pub fn spawn_listener<R: ChainRpc + 'static>(
        &mut self,
        listener_config: ListenerConfig,
        rpc: Arc<R>,
        codec: Arc<dyn MessageCodec>,
    ) {
        info!(
            blockchain = listener_config.blockchain.as_str(),
            "starting block listener"
        );
        let listener = BlockListener::new(
            listener_config,
            rpc,
            codec,
            self.state.clone(),
            self.buses.rx.clone(),
        );
        self.tasks.push(tokio::spawn(listener.run()));
    }

    /// Stop every task, flush the state and clear the master key.
    ///
    /// # Errors
    ///
    /// Propagates the final save failure.
    pub async fn shutdown(mut self) -> Result<(), StateError> {
        for task in self.tasks.drain(..) {
            task.abort();
        }
        self.state.close_state().await?;
        info!("gateway core stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::UnresolvedRetriever;
    use wf_auth::MockSignatureFetcher;
    use wf_state::InMemoryDatastore;

    fn test_gateway() -> Gateway {
        Gateway::new(
            GatewayConfig::for_testing(),
            Arc::new(InMemoryDatastore::new()),
            Arc::new(MockSignatureFetcher::new()),
            Arc::new(UnresolvedRetriever::new()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_start_and_shutdown() {
        let mut gateway = test_gateway();
        gateway.start().await.unwrap();
        assert!(gateway.state.get_originators().is_empty());
        gateway.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_clears_master_key() {
        let mut gateway = test_gateway();
        gateway.start().await.unwrap();
        let state = gateway.state.clone();
        gateway.shutdown().await.unwrap();
        assert!(state.save_state().await.is_err());
    }
}
