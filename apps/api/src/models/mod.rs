pub mod candidate;

pub use candidate::{CandidateStatus, Decision};
