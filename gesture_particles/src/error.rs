use thiserror::Error;

/// Failures that end the application.
///
/// Landmark-source and MIDI problems are not here: they degrade to "no hands"
/// and silent cues respectively and are only logged.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("window error: {0}")]
    Window(#[from] minifb::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}
