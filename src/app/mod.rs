// Application layer - Use case interactors

pub mod compress_interactor;
pub mod container;
pub mod session_interactor;

// Re-export interactors
pub use compress_interactor::{CompressionOrchestrator, JobUpdate, OrchestratorPhase};
pub use container::{AppContainer, DefaultAppContainer};
pub use session_interactor::CompressionSession;
