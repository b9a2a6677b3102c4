use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Similarity search error: {0}")]
    Search(#[from] SearchError),

    #[error("QA service error: {0}")]
    Qa(#[from] QaError),

    #[error("Workflow graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Storage layer errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database connection failed: {message}")]
    Connection { message: String },

    #[error("Query failed: {message}")]
    Query { message: String },

    #[error("Migration failed: {message}")]
    Migration { message: String },

    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Similarity index errors
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Similarity index unavailable: {message}")]
    Unavailable { message: String },

    #[error("Corpus not loaded: {corpus}")]
    CorpusNotLoaded { corpus: String },
}

/// Extractive QA service errors
#[derive(Debug, Error)]
pub enum QaError {
    #[error("QA service unavailable: {message} (retries: {retries})")]
    Unavailable { message: String, retries: u32 },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Workflow graph construction and traversal errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("No entry point declared")]
    MissingEntryPoint,

    #[error("Entry point is not a registered node: {name}")]
    UnknownEntryPoint { name: String },

    #[error("Node registered twice: {name}")]
    DuplicateNode { name: String },

    #[error("Edge starts at unregistered node: {from}")]
    UnknownEdgeSource { from: String },

    #[error("Edge from {from} targets unregistered node: {to}")]
    DanglingEdgeTarget { from: String, to: String },

    #[error("Conditional edge from {from} maps branch {branch} to unregistered node: {to}")]
    DanglingBranchTarget {
        from: String,
        branch: String,
        to: String,
    },

    #[error("Node unreachable from entry point: {name}")]
    UnreachableNode { name: String },

    #[error("Conditional edge from {from} returned unmapped branch key: {branch}")]
    UnknownBranch { from: String, branch: String },

    #[error("Traversal exceeded {steps} steps; the graph contains a cycle")]
    CycleDetected { steps: usize },
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for similarity index operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Result type alias for QA service operations
pub type QaResult<T> = Result<T, QaError>;
