use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("posts resource unreachable: {0}")]
    Transport(String),
    #[error("request to posts resource timed out")]
    Timeout,
    #[error("HTTP error! status: {0}")]
    Status(u16),
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("invalid posts resource url '{0}'")]
    InvalidBaseUrl(String),
}

/// The CRUD operation a failure happened in; selects the user-facing wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    Create,
    Delete,
}

impl Operation {
    fn connectivity_message(self) -> &'static str {
        match self {
            Operation::Fetch => "Failed to load posts. Please check if the server is running.",
            Operation::Create => "Failed to create post. Please try again.",
            Operation::Delete => "Failed to delete post. Please try again.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The resource could not be reached at all.
    Transport,
    /// The resource answered with a non-success status.
    Rejected,
    /// The resource answered 2xx with a body we could not use.
    Protocol,
}

impl ResourceError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ResourceError::Transport(_)
            | ResourceError::Timeout
            | ResourceError::InvalidBaseUrl(_) => FailureKind::Transport,
            ResourceError::Status(_) => FailureKind::Rejected,
            ResourceError::Decode(_) => FailureKind::Protocol,
        }
    }

    /// Message shown to the user. Status failures carry the code; transport
    /// failures get a generic, actionable text that never mentions a status.
    pub fn user_message(&self, operation: Operation) -> String {
        match self {
            ResourceError::Status(code) => format!("HTTP error! status: {code}"),
            ResourceError::Timeout => format!(
                "The server took too long to respond. {}",
                operation.connectivity_message()
            ),
            ResourceError::Transport(_) | ResourceError::InvalidBaseUrl(_) => {
                operation.connectivity_message().to_string()
            }
            ResourceError::Decode(detail) => format!("Unexpected response from server: {detail}"),
        }
    }
}

impl From<reqwest::Error> for ResourceError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            ResourceError::Timeout
        } else if value.is_decode() {
            ResourceError::Decode(value.to_string())
        } else if let Some(status) = value.status() {
            ResourceError::Status(status.as_u16())
        } else {
            ResourceError::Transport(value.to_string())
        }
    }
}
