use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Dealer,
    Customer,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Role::Admin => "admin",
            Role::Dealer => "dealer",
            Role::Customer => "customer",
        })
    }
}

/// The signed-in identity, persisted under the `user` key while signed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Payload for creating a new account.
#[derive(Clone)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl std::fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

/// A built-in account with a fixed role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoAccount {
    pub email: &'static str,
    pub password: &'static str,
    pub name: &'static str,
    pub role: Role,
}

/// One account per role, usable without signing up.
pub const DEMO_ACCOUNTS: [DemoAccount; 3] = [
    DemoAccount {
        email: "admin@rks.com",
        password: "admin123",
        name: "Admin User",
        role: Role::Admin,
    },
    DemoAccount {
        email: "dealer@rks.com",
        password: "dealer123",
        name: "Dealer User",
        role: Role::Dealer,
    },
    DemoAccount {
        email: "customer@rks.com",
        password: "customer123",
        name: "Customer User",
        role: Role::Customer,
    },
];

impl DemoAccount {
    pub fn for_role(role: Role) -> &'static DemoAccount {
        match role {
            Role::Admin => &DEMO_ACCOUNTS[0],
            Role::Dealer => &DEMO_ACCOUNTS[1],
            Role::Customer => &DEMO_ACCOUNTS[2],
        }
    }
}
