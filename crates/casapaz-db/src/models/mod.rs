//! Relational models over the casapaz schema.

pub mod analytics;
pub mod follow_up;
pub mod group;
pub mod member;
pub mod network;
pub mod report;
pub mod service_report;
pub mod user;
pub mod vision_phase;

pub use follow_up::{FollowUp, FollowUpDetail, Note, NoteWithAuthor, PendingFollowUp};
pub use group::{Group, GroupSummary, NewGroup, UpdateGroup};
pub use member::{Member, MemberSummary, NewMember, UpdateMember};
pub use network::{Network, NetworkSummary};
pub use report::{
    AttendanceRow, CreatedReport, NewAttendanceEntry, NewReport, NewVisit, Report, ReportSummary,
    VisitRow,
};
pub use service_report::ServiceReport;
pub use user::{UpdateUser, User, UserSummary};
pub use vision_phase::{MemberPhase, PhaseSummary, SubnetPhaseSummary, VisionPhase};
