//! Common types used throughout the application

use serde::{Deserialize, Serialize};

/// Lifecycle status of a route inside a routing context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteStatus {
    /// Route is being set up
    Initializing,
    /// Route is set up but has not been started
    Initialized,
    /// Route consumer is starting
    Starting,
    /// Route is active and consuming
    Started,
    /// Route consumer is stopping
    Stopping,
    /// Route has stopped
    Stopped,
    /// Route is being suspended
    Suspending,
    /// Route is suspended
    Suspended,
}

impl RouteStatus {
    /// Whether the route is currently consuming messages
    pub fn is_started(&self) -> bool {
        matches!(self, RouteStatus::Started)
    }
}

impl std::fmt::Display for RouteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteStatus::Initializing => write!(f, "Initializing"),
            RouteStatus::Initialized => write!(f, "Initialized"),
            RouteStatus::Starting => write!(f, "Starting"),
            RouteStatus::Started => write!(f, "Started"),
            RouteStatus::Stopping => write!(f, "Stopping"),
            RouteStatus::Stopped => write!(f, "Stopped"),
            RouteStatus::Suspending => write!(f, "Suspending"),
            RouteStatus::Suspended => write!(f, "Suspended"),
        }
    }
}

impl std::str::FromStr for RouteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "initializing" => Ok(RouteStatus::Initializing),
            "initialized" => Ok(RouteStatus::Initialized),
            "starting" => Ok(RouteStatus::Starting),
            "started" => Ok(RouteStatus::Started),
            "stopping" => Ok(RouteStatus::Stopping),
            "stopped" => Ok(RouteStatus::Stopped),
            "suspending" => Ok(RouteStatus::Suspending),
            "suspended" => Ok(RouteStatus::Suspended),
            _ => Err(format!("Invalid route status: {}", s)),
        }
    }
}

/// Header carried on IDSCP2 messages
pub const IDSCP2_HEADER: &str = "idscp2-header";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_status_display() {
        assert_eq!(RouteStatus::Started.to_string(), "Started");
        assert_eq!(RouteStatus::Stopped.to_string(), "Stopped");
    }

    #[test]
    fn test_route_status_parse() {
        assert_eq!("started".parse::<RouteStatus>().unwrap(), RouteStatus::Started);
        assert_eq!("Suspended".parse::<RouteStatus>().unwrap(), RouteStatus::Suspended);
        assert!("running".parse::<RouteStatus>().is_err());
    }
}
