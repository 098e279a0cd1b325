pub mod actor;
pub mod answer;
pub mod maintenance_report;
pub mod report;
pub mod target;
pub mod verdict;
pub mod vote_result;

pub use actor::{Actor, Role, VerificationStatus};
pub use answer::Answer;
pub use maintenance_report::MaintenanceReport;
pub use report::Report;
pub use target::TargetRef;
pub use verdict::DuplicateVerdict;
pub use vote_result::VoteResult;
