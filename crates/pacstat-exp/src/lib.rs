//! Merge and gain computation for PAC search benchmark tables.

pub mod columns;
mod baseline;
mod config;
mod gains;
mod key;
mod merge;
mod pipeline;

pub use baseline::annotate_baseline;
pub use config::{
    BaselineConfig, BaselineJob, DuplicatePolicy, GainConfig, MergeConfig, PipelineConfig,
    ReferenceSpec, SourceSpec,
};
pub use gains::{augment, compute_gains, gain, Augmentation, GainReport, ReferenceIndex};
pub use key::ExperimentKey;
pub use merge::{merge, round_to};
pub use pipeline::{run_baseline, run_batch, run_domain, BatchReport, DomainOutcome, DomainReport};
