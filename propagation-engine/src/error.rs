/// Failure modes the engine can report. `NearMiss` and threshold rejection
/// are not represented here — they are silent control flow, never surfaced
/// to a caller (see `reflection` and `eigenray_extractor`).
#[derive(Debug, thiserror::Error)]
pub enum PropagationError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("environment query failed: {0}")]
    Environment(String),
}

pub type Result<T> = std::result::Result<T, PropagationError>;
