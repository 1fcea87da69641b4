use std::path::PathBuf;

use thiserror::Error;

/// Failure reported by an inventory, metrics or log collaborator.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(transparent)]
    Api(#[from] kube::Error),

    #[error("build request: {0}")]
    Request(#[from] http::Error),

    #[error("{kind} {name} not found")]
    NotFound { kind: &'static str, name: String },

    #[error("no {resource} usage reported for {entity}")]
    MissingUsage { entity: String, resource: &'static str },

    #[error("invalid quantity {value:?} reported for {entity}")]
    InvalidQuantity { entity: String, value: String },

    #[error("pod {pod} is not scheduled on any node")]
    Unscheduled { pod: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UtilizationError {
    #[error("capacity reference has zero memory")]
    ZeroCapacity,
}

/// Invocation-level failure; no partial output is produced.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to fetch {what}: {source}")]
    Inventory {
        what: &'static str,
        #[source]
        source: ProviderError,
    },

    #[error("error opening stream for pod logs of {pod}: {source}")]
    LogStream {
        pod: String,
        #[source]
        source: ProviderError,
    },

    #[error("error reading logs: {0}")]
    LogRead(#[source] std::io::Error),

    #[error("error saving logs to {}: {source}", path.display())]
    LogPersist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
