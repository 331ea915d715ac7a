pub mod profile_section;

pub use profile_section::{NewProfileSection, ProfileSection, SectionKind};
