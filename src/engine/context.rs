use std::sync::RwLock;
use std::time::Instant;

use dashmap::DashMap;
use tracing::{debug, info};

use crate::common::error::{Error, Result};
use crate::common::types::RouteStatus;

use super::route::RouteDefinition;

/// A running routing context hosting zero or more routes.
///
/// Definitions are kept in insertion order. Statuses are tracked per route id
/// and updated by whoever serves the route. Uptime is measured from the last
/// [`start`](Self::start) with a monotonic clock and reads 0 while stopped.
#[derive(Debug)]
pub struct RoutingContext {
    name: String,
    started_at: RwLock<Option<Instant>>,
    definitions: RwLock<Vec<RouteDefinition>>,
    statuses: DashMap<String, RouteStatus>,
}

impl RoutingContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            started_at: RwLock::new(None),
            definitions: RwLock::new(Vec::new()),
            statuses: DashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a route. Ids must be unique within the context.
    ///
    /// Routes added to a started context start immediately.
    pub fn add_route(&self, definition: RouteDefinition) -> Result<()> {
        let mut definitions = self
            .definitions
            .write()
            .map_err(|_| Error::registry(format!("route table of '{}' is poisoned", self.name)))?;

        if definitions.iter().any(|d| d.id == definition.id) {
            return Err(Error::registry(format!(
                "Duplicate route id '{}' in context '{}'",
                definition.id, self.name
            )));
        }

        // start()/stop()と競合しないよう、時計のロックを保持したまま状態を登録
        let started_at = self.started_at.read().map_err(|_| self.clock_poisoned())?;
        let status = if started_at.is_some() {
            RouteStatus::Started
        } else {
            RouteStatus::Stopped
        };

        debug!("Adding route '{}' to context '{}' ({})", definition.id, self.name, status);
        self.statuses.insert(definition.id.clone(), status);
        definitions.push(definition);
        Ok(())
    }

    /// Snapshot of the route definitions in insertion order.
    pub fn route_definitions(&self) -> Result<Vec<RouteDefinition>> {
        self.definitions
            .read()
            .map(|definitions| definitions.clone())
            .map_err(|_| Error::registry(format!("route table of '{}' is poisoned", self.name)))
    }

    pub fn route_status(&self, route_id: &str) -> Option<RouteStatus> {
        self.statuses.get(route_id).map(|status| *status)
    }

    pub fn set_route_status(&self, route_id: &str, status: RouteStatus) -> Result<()> {
        match self.statuses.get_mut(route_id) {
            Some(mut entry) => {
                debug!("Route '{}' in '{}': {} -> {}", route_id, self.name, *entry, status);
                *entry = status;
                Ok(())
            }
            None => Err(Error::registry(format!(
                "Unknown route '{}' in context '{}'",
                route_id, self.name
            ))),
        }
    }

    /// Start the context and every route it hosts. Starting twice keeps the
    /// original start instant.
    pub fn start(&self) -> Result<()> {
        {
            let mut started_at = self.started_at.write().map_err(|_| self.clock_poisoned())?;
            if started_at.is_none() {
                *started_at = Some(Instant::now());
            }
            self.transition_all(RouteStatus::Started);
        }

        info!("Routing context '{}' started with {} route(s)", self.name, self.statuses.len());
        Ok(())
    }

    /// Stop every route and reset the uptime clock.
    pub fn stop(&self) -> Result<()> {
        {
            let mut started_at = self.started_at.write().map_err(|_| self.clock_poisoned())?;
            self.transition_all(RouteStatus::Stopped);
            *started_at = None;
        }
        info!("Routing context '{}' stopped", self.name);
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.started_at
            .read()
            .map(|started_at| started_at.is_some())
            .unwrap_or(false)
    }

    /// Milliseconds since the context was started, 0 when stopped.
    pub fn uptime_millis(&self) -> u64 {
        self.started_at
            .read()
            .ok()
            .and_then(|started_at| *started_at)
            .map(|instant| instant.elapsed().as_millis() as u64)
            .unwrap_or(0)
    }

    fn transition_all(&self, to: RouteStatus) {
        for mut entry in self.statuses.iter_mut() {
            *entry = to;
        }
    }

    fn clock_poisoned(&self) -> Error {
        Error::registry(format!("uptime clock of '{}' is poisoned", self.name))
    }
}
