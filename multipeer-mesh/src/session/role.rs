use multipeer_core::Role;

/// Role-specific completeness rule and signaling behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolePolicy {
    role: Role,
}

impl RolePolicy {
    pub fn new(role: Role) -> Self {
        Self { role }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Client: exactly one connected peer, the server.
    /// Server: one connected peer per other room member. The room count
    /// includes the server itself, which never appears in the registry.
    pub fn is_fully_connected(&self, connected: usize, room_count: Option<usize>) -> bool {
        match self.role {
            Role::Client => connected == 1,
            Role::Server => room_count.is_some_and(|count| connected + 1 >= count),
        }
    }

    /// Only the server is told to initiate toward newly joined members.
    pub fn initiates_toward_joiners(&self) -> bool {
        self.role == Role::Server
    }
}

/// Edge detector for the "fully connected" notification.
#[derive(Debug, Default)]
pub struct FullConnectLatch {
    satisfied: bool,
}

impl FullConnectLatch {
    /// Record the current completeness. True only on a false -> true crossing.
    pub fn update(&mut self, satisfied: bool) -> bool {
        let crossed = satisfied && !self.satisfied;
        self.satisfied = satisfied;
        crossed
    }

    pub fn is_satisfied(&self) -> bool {
        self.satisfied
    }
}
