/// Site-wide capabilities an actor may hold.
///
/// These come from the host platform's permission model; the profile engine
/// only ever asks whether an actor holds one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteCapability {
    /// Edit any page or page-owned record on the site
    EditAllContent,

    /// Approve, confirm and otherwise administer member accounts
    ManageMembers,

    /// Full admin access to all operations
    FullAdmin,
}

