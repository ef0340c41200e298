use thiserror::Error;

/// Message shown for every failure that is not a provider status error.
const UNAVAILABLE: &str = "Error: weather service unavailable";

#[derive(Debug, Error)]
pub enum LookupError {
    /// The provider answered with a non-success status.
    #[error("Error: {status} - {message}")]
    Provider { status: u16, message: String },

    /// The request never completed or the body could not be read.
    #[error("Transport error talking to OpenWeather: {0}")]
    Transport(#[from] reqwest::Error),

    /// Success status, but the payload was not what we expect.
    #[error("Failed to parse OpenWeather {what} JSON: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl LookupError {
    /// The single string shown to whoever asked for the weather.
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider { .. } => self.to_string(),
            Self::Transport(_) | Self::Decode { .. } => UNAVAILABLE.to_string(),
        }
    }

    pub fn is_provider(&self) -> bool {
        matches!(self, Self::Provider { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Short tag for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Provider { .. } => "provider",
            Self::Transport(_) => "transport",
            Self::Decode { .. } => "decode",
        }
    }
}
