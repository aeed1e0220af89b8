//! The capabilities one workflow invocation runs against.

use chainbind_core::{ConsensusAggregate, EvmClient, HttpFetcher, ReportGenerator};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::error::WorkflowError;

/// Chain clients keyed by chain selector, plus the report and HTTP
/// capabilities.
///
/// Node-mode work (such as the proof-of-reserve fetch) is run once per
/// simulated execution and the observations are merged with the result
/// type's [`ConsensusAggregate`] impl.
#[derive(Clone)]
pub struct Runtime {
    clients: HashMap<u64, Arc<dyn EvmClient>>,
    reports: Arc<dyn ReportGenerator>,
    http: Arc<dyn HttpFetcher>,
    node_executions: usize,
}

impl Runtime {
    pub fn new(reports: Arc<dyn ReportGenerator>, http: Arc<dyn HttpFetcher>) -> Self {
        Self {
            clients: HashMap::new(),
            reports,
            http,
            node_executions: 1,
        }
    }

    /// Register a client under its own chain selector, replacing any
    /// previous client for that chain.
    pub fn with_client(mut self, client: Arc<dyn EvmClient>) -> Self {
        self.clients.insert(client.chain_selector(), client);
        self
    }

    /// Number of independent executions for node-mode work. Clamped to at
    /// least one.
    pub fn with_node_executions(mut self, n: usize) -> Self {
        self.node_executions = n.max(1);
        self
    }

    pub fn client(&self, chain_selector: u64) -> Result<Arc<dyn EvmClient>, WorkflowError> {
        self.clients
            .get(&chain_selector)
            .cloned()
            .ok_or(WorkflowError::NoClient {
                selector: chain_selector,
            })
    }

    pub fn reports(&self) -> Arc<dyn ReportGenerator> {
        Arc::clone(&self.reports)
    }

    pub fn node_executions(&self) -> usize {
        self.node_executions
    }

    /// Run `observe` once per execution and merge the observations. Any
    /// failed execution fails the whole step.
    pub async fn run_in_node_mode<T, F, Fut>(&self, mut observe: F) -> Result<T, WorkflowError>
    where
        T: ConsensusAggregate,
        F: FnMut(Arc<dyn HttpFetcher>) -> Fut,
        Fut: Future<Output = Result<T, WorkflowError>>,
    {
        let mut observations = Vec::with_capacity(self.node_executions);
        for _ in 0..self.node_executions {
            observations.push(observe(Arc::clone(&self.http)).await?);
        }
        Ok(T::aggregate(observations)?)
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut chains: Vec<_> = self.clients.keys().copied().collect();
        chains.sort_unstable();
        f.debug_struct("Runtime")
            .field("chains", &chains)
            .field("node_executions", &self.node_executions)
            .finish_non_exhaustive()
    }
}
