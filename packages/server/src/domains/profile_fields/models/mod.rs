pub mod profile_field;

pub use profile_field::{
    FieldSettings, FormVisibility, NewProfileField, ProfileField, PublicVisibility,
};
