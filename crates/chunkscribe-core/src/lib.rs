// Domain modules (organized by concern)
pub mod audio;
pub mod dispatch;
pub mod merge;
pub mod plan;
pub mod provider;

// Utility modules (cross-cutting concerns)
pub mod cancel;
pub mod config;
pub mod error;
pub mod verbose;

// Re-export audio types
pub use audio::{
    AudioError, AudioPayload, AudioProbe, ChunkExtractor, Silence, WavExtractor, WavProbe,
    WavSource,
};

// Re-export planning types
pub use plan::{Chunk, CutKind, plan};

// Re-export dispatch types
pub use dispatch::{
    ChunkResult, DispatchHooks, ErrorKind, NoopHooks, PlanOutcome, PlanStatus, RetryPolicy,
    classify, transcribe_all,
};

// Re-export merge types
pub use merge::{MergeDiagnostics, MergedTranscript, MergedWord, merge};

// Re-export provider types
pub use provider::{
    GroqProvider, ServiceError, TranscriptionBackend, TranscriptionRequest, VerboseTranscript,
    WordTiming, validate_api_key,
};

// Re-export other utility types
pub use cancel::CancelToken;
pub use config::{DEFAULT_MODEL, TranscribeConfig};
pub use error::{ChunkscribeError, Result};
pub use verbose::set_verbose;
