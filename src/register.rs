//! Agent and tool registration for the Alfred binary.

use std::sync::Arc;

use tracing::{debug, info, warn};

use alfred_config::Config;
use alfred_graph_memory::InMemoryGraphStore;
use alfred_orchestrator::{Coordinator, RetryGraphStore};
use alfred_protocols::{Agent, GraphStore, Tool, VectorStore};
use alfred_vector_memory::InMemoryVectorStore;

use crate::agents::{EchoAgent, ToolRunnerAgent};
use crate::tools::{builtin_tools, knowledge_tools};

/// Capabilities served by the built-in agents.
pub(crate) const BUILTIN_CAPABILITIES: [&str; 2] = ["echo", "run_tool"];

/// Register the built-in agents.
pub(crate) fn register_builtin_agents(coordinator: &Coordinator) {
    let agents: Vec<Arc<dyn Agent>> = vec![
        Arc::new(EchoAgent::new()),
        Arc::new(ToolRunnerAgent::new()),
    ];

    for agent in agents {
        let id = agent.id().to_string();
        match coordinator.register_agent(agent) {
            Ok(()) => debug!("Registered agent: {}", id),
            Err(e) => warn!("Failed to register agent {}: {}", id, e),
        }
    }

    info!("Total registered agents: {}", coordinator.agents().len());
}

/// Register the text utilities plus the graph and vector knowledge tools.
pub(crate) fn register_builtin_tools(coordinator: &Coordinator, config: &Config) {
    // The graph store is in-process; a configured remote uri is only reported.
    debug!(
        "Knowledge graph: in-memory (configured uri {}, database {})",
        config.graph.uri, config.graph.database
    );
    let graph: Arc<dyn GraphStore> = Arc::new(RetryGraphStore::new(
        Arc::new(InMemoryGraphStore::new()),
        coordinator.engine().config().default_retry.clone(),
    ));
    let vectors: Arc<dyn VectorStore> = Arc::new(InMemoryVectorStore::new(config.vector.dimension));

    let tools: Vec<Arc<dyn Tool>> = builtin_tools()
        .into_iter()
        .chain(knowledge_tools(graph, vectors))
        .collect();

    for tool in tools {
        let name = tool.descriptor().name.clone();
        if coordinator.register_tool(tool) {
            debug!("Registered tool: {}", name);
        } else {
            warn!("Tool {} already registered, skipping", name);
        }
    }

    info!("Total registered tools: {}", coordinator.tools().len());
}
