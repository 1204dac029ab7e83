//! Study guide synthesis: orchestration, post-processing, assembly.

mod orchestrator;
pub mod postprocess;

pub use orchestrator::{
    FailurePolicy, SynthesisConfig, SynthesisError, SynthesisEvent, SynthesisOutcome,
    SynthesisPhase, SynthesisService,
};
