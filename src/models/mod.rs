pub mod account;
pub mod attendance;
pub mod member;

pub use account::{Account, AccountSummary, Role};
pub use attendance::AttendanceRecord;
pub use member::{
    parse_date, CompletedCourses, Course, HierarchyMember, MemberField, MemberStatus, NewMember,
    DEFAULT_RANK,
};
