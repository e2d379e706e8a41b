//! Event type definitions.

use serde::{Deserialize, Serialize};

/// Everything the engine reports while it works
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Image grouping
    Group(GroupEvent),
    /// Identification and box/order accounting
    Intake(IntakeEvent),
    /// Pipeline lifecycle
    Pipeline(PipelineEvent),
}

/// Events emitted while partitioning a photo batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GroupEvent {
    /// Grouping started over this many input images
    Started { total_images: usize },
    /// The first image was captured as the blank reference
    BlankReference { image: String },
    /// One image was decoded (and compared against the blank, if any)
    Progress(GroupProgress),
    /// An image looked like the blank reference and was dropped
    BlankSkipped { image: String },
    /// Grouping finished
    Completed { groups: usize, skipped: usize },
}

/// Progress of the decode/compare pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupProgress {
    /// Images processed so far
    pub checked: usize,
    /// Images to process in total (excluding the blank reference)
    pub total: usize,
    /// Label of the image just processed
    pub current: String,
}

/// Events emitted while turning groups into boxed items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IntakeEvent {
    /// A group was identified as an item
    Identified { group_index: usize, identity: String },
    /// No item could be identified from a group
    Unidentified { group_index: usize },
    /// The item was already present in the box or the order
    DuplicateRejected { group_index: usize, identity: String },
    /// The filled box was handed to the order
    BoxAdded {
        box_id: String,
        items: usize,
        total_value: f64,
        remaining_value: f64,
    },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    Started,
    PhaseChanged { phase: PipelinePhase },
    Completed { summary: PipelineSummary },
    Error { message: String },
}

/// Phases of an intake run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Listing,
    Grouping,
    Identifying,
    Accounting,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Listing => write!(f, "Listing photos"),
            PipelinePhase::Grouping => write!(f, "Grouping photos"),
            PipelinePhase::Identifying => write!(f, "Identifying items"),
            PipelinePhase::Accounting => write!(f, "Updating order"),
        }
    }
}

/// Summary sent when an intake run completes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub total_images: usize,
    pub listings: usize,
    pub identified: usize,
    pub duplicates: usize,
    pub box_value: f64,
    pub remaining_value: f64,
    pub duration_ms: u64,
}
