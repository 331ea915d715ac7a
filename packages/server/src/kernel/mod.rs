//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod field_definitions;
pub mod mailer;
pub mod permissions;
pub mod pg_store;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use field_definitions::{
    BaseFieldDefinitionProvider, FieldCatalog, FieldDefinition, FieldKind,
    MemoizedFieldDefinitions, StaticMemberForm,
};
pub use mailer::LoggingMailer;
pub use permissions::ClaimsPermissionService;
pub use pg_store::PgProfileStore;
pub use test_dependencies::TestDependencies;
pub use traits::*;
