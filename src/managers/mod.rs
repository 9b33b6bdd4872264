pub mod credential_store;
pub mod dashboard;
pub mod member_repository;
pub mod registration;
pub mod roster_editor;

pub use credential_store::{create_shared_credential_store, CredentialStore, SharedCredentialStore};
pub use dashboard::{load_summary, RosterSummary};
pub use member_repository::{
    create_shared_member_repository, MemberRepository, SharedMemberRepository,
};
pub use registration::{RegistrationForm, RegistrationWorkflow};
pub use roster_editor::{EditorMode, RosterEditor, SaveOutcome};
