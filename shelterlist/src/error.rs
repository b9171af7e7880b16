/// A failed page fetch.
///
/// Both variants are handled the same way by the orchestrator: the failure is logged, paging
/// stops (`has_more = false`) and the state machine returns to idle.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}
