use super::member::{MemberId, MemberRegistration};

/// A capacity-bounded registration list (a room category, a seat pool).
///
/// `registration_open` is a manually set signal and is never derived from
/// the capacity. Callers that want to present a resource as bookable check
/// both `registration_open()` and `is_full()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resource {
    pub(crate) registered_members: Vec<MemberRegistration>,
    pub(crate) limit: Option<u32>,
    pub(crate) registration_open: bool,
    pub(crate) with_waitinglist: bool,
}

impl Resource {
    /// A fresh resource accepting registrations, with an optional capacity.
    pub fn create(limit: Option<u32>) -> Self {
        Self {
            registered_members: Vec::new(),
            limit,
            registration_open: true,
            with_waitinglist: false,
        }
    }

    /// Member ids in registration order.
    pub fn registered_members(&self) -> Vec<&str> {
        self.registered_members
            .iter()
            .map(|r| r.member_id.as_str())
            .collect()
    }

    pub fn registrations(&self) -> &[MemberRegistration] {
        &self.registered_members
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    pub fn registration_open(&self) -> bool {
        self.registration_open
    }

    pub fn with_waitinglist(&self) -> bool {
        self.with_waitinglist
    }

    pub fn is_full(&self) -> bool {
        self.limit
            .is_some_and(|limit| self.registered_members.len() >= limit as usize)
    }

    pub fn is_registered(&self, member_id: &str) -> bool {
        self.registered_members
            .iter()
            .any(|r| r.member_id.as_str() == member_id)
    }

    /// Appends a registration unless the member is already registered or the
    /// resource is full.
    pub fn add_member_id(&mut self, member_id: impl Into<MemberId>) {
        let member_id = member_id.into();
        if self.is_registered(member_id.as_str()) || self.is_full() {
            return;
        }
        self.registered_members
            .push(MemberRegistration::create(member_id));
    }

    pub fn remove_member_id(&mut self, member_id: &str) {
        self.registered_members
            .retain(|r| r.member_id.as_str() != member_id);
    }

    pub fn set_limit(&mut self, limit: Option<u32>) {
        self.limit = limit;
    }

    pub fn set_registration_open(&mut self, open: bool) {
        self.registration_open = open;
    }

    pub fn set_with_waitinglist(&mut self, with_waitinglist: bool) {
        self.with_waitinglist = with_waitinglist;
    }

    /// Takes over the capacity of `source` and resets everything else: no
    /// members, registration open, no waitinglist.
    pub fn copy_from(&mut self, source: &Resource) -> &mut Self {
        self.limit = source.limit;
        self.registered_members = Vec::new();
        self.registration_open = true;
        self.with_waitinglist = false;
        self
    }

    pub fn copied_from(source: &Resource) -> Self {
        let mut copy = Self::default();
        copy.copy_from(source);
        copy
    }
}
