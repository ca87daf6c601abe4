use crate::adapters::resend::ResendMailer;
use crate::config::ShopperConfig;
use crate::core::budget::SuggestBudgetAgent;
use crate::core::notify::{NotifyAgent, Notifier};
use crate::core::search::{SearchSettings, WebSearchAgent};
use crate::domain::model::ShopperState;
use crate::domain::ports::{Agent, ChatClient, Mailer};
use crate::utils::error::{Result, ShopperError};
use crate::utils::monitor::SystemMonitor;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Timing of one agent that actually ran.
#[derive(Debug, Clone)]
pub struct AgentRun {
    pub agent_name: String,
    pub duration: Duration,
}

/// Runs agents in order over a single `ShopperState`.
pub struct AgentGraph {
    agents: Vec<Box<dyn Agent>>,
    monitor: Option<SystemMonitor>,
}

impl AgentGraph {
    pub fn new() -> Self {
        Self {
            agents: Vec::new(),
            monitor: None,
        }
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor = enabled.then(|| SystemMonitor::new(true));
        self
    }

    pub fn add_agent(&mut self, agent: Box<dyn Agent>) {
        self.agents.push(agent);
    }

    pub fn agent_names(&self) -> Vec<&str> {
        self.agents.iter().map(|agent| agent.name()).collect()
    }

    /// SuggestBudget → WebSearch → Notify, wired from configuration.
    pub fn shopper(client: Arc<dyn ChatClient>, config: &ShopperConfig, contact: Option<String>) -> Self {
        let api_key = config.openai.api_key.clone();
        let mailer = ResendMailer::from_config(&config.notify).map(|m| Arc::new(m) as Arc<dyn Mailer>);
        let notifier = Notifier::new(mailer, api_key.clone(), &config.notify.from_email);
        let contact = contact.or_else(|| config.notify.contact.clone());

        let mut graph = Self::new().with_monitoring(config.monitoring.enabled);
        graph.add_agent(Box::new(SuggestBudgetAgent::new(
            client.clone(),
            &config.openai.budget_model,
        )));
        graph.add_agent(Box::new(WebSearchAgent::new(
            client,
            SearchSettings::from_config(config),
        )));
        graph.add_agent(Box::new(NotifyAgent::new(
            Arc::new(notifier),
            contact,
            api_key,
            config.notify.use_email,
        )));
        graph
    }

    pub async fn run(&self, initial: ShopperState) -> Result<(ShopperState, Vec<AgentRun>)> {
        let mut state = initial;
        let mut runs = Vec::new();

        if let Some(monitor) = &self.monitor {
            monitor.log_stats("Agent graph started.");
        }

        for agent in &self.agents {
            if !agent.should_execute(&state) {
                tracing::info!("⏭️ Skipping agent: {} (condition not met)", agent.name());
                continue;
            }

            let start_time = Instant::now();
            match agent.run(state.clone()).await {
                Ok(next) => {
                    let run = AgentRun {
                        agent_name: agent.name().to_string(),
                        duration: start_time.elapsed(),
                    };
                    tracing::info!("✅ Agent executed: {} (duration: {:?})", run.agent_name, run.duration);
                    state = next;
                    runs.push(run);
                }
                Err(e) => {
                    tracing::error!("❌ Agent execution failed: {}", e);
                    return Err(ShopperError::AgentFailed {
                        agent: agent.name().to_string(),
                        details: e.to_string(),
                    });
                }
            }
        }

        if let Some(monitor) = &self.monitor {
            monitor.log_stats("Agent graph completed.");
            monitor.log_final_stats();
        }

        Ok((state, runs))
    }

    pub fn execution_summary(runs: &[AgentRun]) -> HashMap<String, serde_json::Value> {
        let mut summary = HashMap::new();

        let total_duration: Duration = runs.iter().map(|r| r.duration).sum();
        summary.insert("total_agents".to_string(), serde_json::Value::from(runs.len()));
        summary.insert(
            "total_duration_ms".to_string(),
            serde_json::Value::from(total_duration.as_millis() as u64),
        );

        let names: Vec<serde_json::Value> = runs
            .iter()
            .map(|r| serde_json::Value::String(r.agent_name.clone()))
            .collect();
        summary.insert("executed_agents".to_string(), serde_json::Value::Array(names));

        summary
    }
}

impl Default for AgentGraph {
    fn default() -> Self {
        Self::new()
    }
}
