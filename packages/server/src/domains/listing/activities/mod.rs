pub mod viewer;

pub use viewer::{list_members, view_member, ListingRow, MemberListing, MemberProfileView};
