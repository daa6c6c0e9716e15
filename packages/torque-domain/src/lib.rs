pub mod conversation;
pub mod fusion;
pub mod label;
pub mod lucene;
pub mod node;

pub use conversation::{ConversationState, Role, Turn};
pub use fusion::{Channel, FusedResult, FusionParams, ScoredCandidate};
pub use label::{Label, UnknownLabel};
pub use node::{NeighborhoodEntry, NodeRef};
