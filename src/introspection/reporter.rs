use std::io::Write;

use tracing::{info, warn};

use super::query::RegistryQueryService;

/// Prints the active routes and registered components once at startup.
pub struct StartupReporter {
    query: RegistryQueryService,
}

impl StartupReporter {
    pub fn new(query: RegistryQueryService) -> Self {
        Self { query }
    }

    /// Write one `Route: <short name>` line per route, then one
    /// `Component: <bundle name>` line per component. Write errors are logged.
    pub fn report<W: Write>(&self, out: &mut W) {
        let routes = self.query.get_routes();
        let components = self.query.list_components();

        let lines = routes
            .iter()
            .map(|route| format!("Route: {}", route.short_name))
            .chain(
                components
                    .iter()
                    .map(|component| format!("Component: {}", component.bundle_name)),
            );

        for line in lines {
            if let Err(e) = writeln!(out, "{}", line) {
                warn!("Failed to write startup report: {}", e);
                return;
            }
        }
        if let Err(e) = out.flush() {
            warn!("Failed to flush startup report: {}", e);
        }

        info!(
            "Startup report: {} route(s), {} component(s)",
            routes.len(),
            components.len()
        );
    }

    pub fn report_to_stdout(&self) {
        self.report(&mut std::io::stdout().lock());
    }
}
