use crate::models::{Contract, Customer, Photographer, PhotographerId, ScheduleEvent};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("failed to read fixtures from {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse fixtures: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The static schedule as shipped in the fixture file.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ScheduleFixtures {
    #[serde(default)]
    pub photographers: Vec<Photographer>,
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub contracts: Vec<Contract>,
    #[serde(default)]
    pub events: Vec<ScheduleEvent>,
}

/// Read-only shoots plus the photographer, customer and contract records they
/// point at. Events keep fixture order.
#[derive(Debug, Default)]
pub struct ScheduleStore {
    events: Vec<ScheduleEvent>,
    photographers: HashMap<PhotographerId, Photographer>,
    customers: HashMap<String, Customer>,
    contracts: HashMap<String, Contract>,
}

impl ScheduleStore {
    pub fn new(fixtures: ScheduleFixtures) -> Self {
        let mut seen = HashSet::new();
        let mut events = Vec::with_capacity(fixtures.events.len());
        for event in fixtures.events {
            if !seen.insert(event.id.clone()) {
                tracing::warn!(event_id = %event.id, "duplicate shoot id in fixtures, keeping the first");
                continue;
            }
            if event.end < event.start {
                tracing::warn!(event_id = %event.id, "shoot ends before it starts");
            }
            events.push(event);
        }

        Self {
            events,
            photographers: fixtures
                .photographers
                .into_iter()
                .map(|p| (p.id.clone(), p))
                .collect(),
            customers: fixtures
                .customers
                .into_iter()
                .map(|c| (c.id.clone(), c))
                .collect(),
            contracts: fixtures
                .contracts
                .into_iter()
                .map(|c| (c.id.clone(), c))
                .collect(),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, FixtureError> {
        let fixtures: ScheduleFixtures = serde_json::from_str(raw)?;
        Ok(Self::new(fixtures))
    }

    pub async fn load(path: &Path) -> Result<Self, FixtureError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| FixtureError::Io {
                path: path.display().to_string(),
                source,
            })?;
        let store = Self::from_json(&raw)?;
        tracing::info!(
            events = store.events.len(),
            photographers = store.photographers.len(),
            path = %path.display(),
            "schedule fixtures loaded"
        );
        Ok(store)
    }

    pub fn events(&self) -> &[ScheduleEvent] {
        &self.events
    }

    pub fn event(&self, id: &str) -> Option<&ScheduleEvent> {
        self.events.iter().find(|event| event.id == id)
    }

    pub fn photographer(&self, id: &str) -> Option<&Photographer> {
        self.photographers.get(id)
    }

    pub fn photographers(&self) -> Vec<&Photographer> {
        let mut photographers: Vec<_> = self.photographers.values().collect();
        photographers.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        photographers
    }

    /// Follows event -> contract -> customer. A dangling link at either step
    /// yields `None`.
    pub fn customer_for(&self, event: &ScheduleEvent) -> Option<&Customer> {
        let contract = self.contracts.get(event.contract_id.as_deref()?)?;
        self.customers.get(&contract.customer_id)
    }

    pub fn is_confirmed(&self, event: &ScheduleEvent) -> bool {
        self.customer_for(event)
            .is_some_and(|customer| customer.lead_status.is_confirmed())
    }
}
