use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("could not find python 2.7: set path_to_python_27 or put one of {candidates:?} on PATH")]
    PythonNotFound { candidates: Vec<String> },

    #[error(transparent)]
    Timer(#[from] TimerError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Misuse of a [`crate::timer::DeferredAction`], or a failure inside its
/// background task.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimerError {
    #[error("deferred action has not been started")]
    NotStarted,

    #[error("deferred action was already started")]
    AlreadyStarted,

    #[error("deferred action already fired or was canceled")]
    Finished,

    #[error("no tokio runtime available to run the deferred action")]
    NoRuntime,

    #[error("deferred action task was aborted")]
    Aborted,

    #[error("deferred action panicked: {0}")]
    ActionPanicked(String),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
