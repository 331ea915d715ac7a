//! The set of MemberChoice fields a member has opted into showing publicly.
//!
//! Stored as a JSON array of member field names in a JSONB column.

use serde::{Deserialize, Serialize};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef, Postgres};
use sqlx::types::Json;
use sqlx::{Decode, Encode, Type};
use std::collections::BTreeSet;

use crate::common::ProfileError;
use crate::domains::profile_fields::{ProfileField, PublicVisibility, VisibilityResolver};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicFieldSelections(BTreeSet<String>);

impl PublicFieldSelections {
    pub fn contains(&self, member_field: &str) -> bool {
        self.0.contains(member_field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Opt-ins a new member starts with: every MemberChoice field whose
    /// `public_visibility_default` is set.
    pub fn defaults_for(fields: &[ProfileField], resolver: &VisibilityResolver) -> Self {
        fields
            .iter()
            .filter(|field| {
                field.public_visibility_default
                    && resolver.effective_public_visibility(field) == PublicVisibility::MemberChoice
            })
            .map(|field| field.member_field.clone())
            .collect()
    }

    /// Accept only fields the member is actually allowed to choose on this page.
    pub fn validated(
        requested: impl IntoIterator<Item = String>,
        fields: &[ProfileField],
        resolver: &VisibilityResolver,
    ) -> Result<Self, ProfileError> {
        let mut selections = BTreeSet::new();
        for name in requested {
            let choosable = fields.iter().any(|field| {
                field.member_field == name
                    && resolver.effective_public_visibility(field) == PublicVisibility::MemberChoice
            });
            if !choosable {
                return Err(ProfileError::NotMemberChoice(name));
            }
            selections.insert(name);
        }
        Ok(Self(selections))
    }
}

impl<S: Into<String>> FromIterator<S> for PublicFieldSelections {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl Type<Postgres> for PublicFieldSelections {
    fn type_info() -> PgTypeInfo {
        <Json<BTreeSet<String>> as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <Json<BTreeSet<String>> as Type<Postgres>>::compatible(ty)
    }
}

impl Encode<'_, Postgres> for PublicFieldSelections {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        <Json<&BTreeSet<String>> as Encode<Postgres>>::encode(Json(&self.0), buf)
    }
}

impl Decode<'_, Postgres> for PublicFieldSelections {
    fn decode(value: PgValueRef<'_>) -> Result<Self, BoxDynError> {
        let Json(names) = <Json<BTreeSet<String>> as Decode<Postgres>>::decode(value)?;
        Ok(Self(names))
    }
}
