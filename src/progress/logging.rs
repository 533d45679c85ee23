//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { manifest, services } => {
                info!(manifest = %manifest, services, "Starting orchestration");
            }
            ProgressEvent::ServiceStarted { service } => {
                info!(service = %service, "Processing service");
            }
            ProgressEvent::ServiceCompleted {
                service,
                success,
                reference,
                duration,
            } => {
                if *success {
                    info!(
                        service = %service,
                        reference = %reference,
                        duration_ms = duration.as_millis(),
                        "Service ready"
                    );
                } else {
                    warn!(
                        service = %service,
                        duration_ms = duration.as_millis(),
                        "Service failed"
                    );
                }
            }
            ProgressEvent::OverridesWritten { path } => {
                info!(path = %path, "Override document written");
            }
            ProgressEvent::StackActivated => {
                info!("Stack is up");
            }
            ProgressEvent::Completed {
                services,
                total_time,
            } => {
                info!(
                    services,
                    total_time_ms = total_time.as_millis(),
                    "Orchestration complete"
                );
            }
            ProgressEvent::Failed { error } => {
                warn!(error = %error, "Orchestration failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_logging_all_events() {
        let handler = LoggingHandler;

        let events = vec![
            ProgressEvent::Started {
                manifest: "docker-compose.yml".to_string(),
                services: 2,
            },
            ProgressEvent::ServiceStarted {
                service: "web".to_string(),
            },
            ProgressEvent::ServiceCompleted {
                service: "web".to_string(),
                success: true,
                reference: "acme/web:a1b2c3d".to_string(),
                duration: Duration::from_millis(50),
            },
            ProgressEvent::ServiceCompleted {
                service: "api".to_string(),
                success: false,
                reference: "acme/api".to_string(),
                duration: Duration::from_millis(10),
            },
            ProgressEvent::OverridesWritten {
                path: "docker-compose.override.yml".to_string(),
            },
            ProgressEvent::StackActivated,
            ProgressEvent::Completed {
                services: 2,
                total_time: Duration::from_secs(5),
            },
            ProgressEvent::Failed {
                error: "1 of 2 service(s) failed".to_string(),
            },
        ];

        // None of these should panic
        for event in events {
            handler.on_progress(&event);
        }
    }
}
