//! Generation pipeline: pitch analysis and segmentation in parallel, then
//! note assembly and bend encoding.

pub mod orchestrator;

pub use orchestrator::{GenerateReport, GenerateRequest, Orchestrator, OrchestratorConfig};
