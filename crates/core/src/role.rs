use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Account role, ordered from least to most privileged.
///
/// Permission checks compare roles with `>=`; there is no other notion of
/// privilege on the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Role {
    #[default]
    User,
    Admin,
    ServerAdmin,
    ManagerAdmin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::User, Role::Admin, Role::ServerAdmin, Role::ManagerAdmin];

    /// Wire name used by the backend.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User         => "user",
            Role::Admin        => "admin",
            Role::ServerAdmin  => "server_admin",
            Role::ManagerAdmin => "manager_admin",
        }
    }

    /// Whether a holder of `self` may perform an action gated on `required`.
    #[must_use]
    pub fn satisfies(self, required: Role) -> bool {
        self >= required
    }

    /// Lenient parse: unknown names fall back to the lowest role.
    #[must_use]
    pub fn from_wire(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s.trim())
            .ok_or_else(|| format!("unknown role '{s}'"))
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Role::from_wire(&raw))
    }
}
