//! Route gating by authentication and role.

use crate::model::{Identity, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Auth,
    Products,
    Deals,
    Recipes,
    Admin,
    Dealer,
    Profile,
}

impl Route {
    pub const ALL: [Route; 8] = [
        Route::Home,
        Route::Auth,
        Route::Products,
        Route::Deals,
        Route::Recipes,
        Route::Admin,
        Route::Dealer,
        Route::Profile,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Auth => "/auth",
            Route::Products => "/products",
            Route::Deals => "/deals",
            Route::Recipes => "/recipes",
            Route::Admin => "/admin",
            Route::Dealer => "/dealer",
            Route::Profile => "/profile",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        Self::ALL.into_iter().find(|route| route.path() == path)
    }

    /// Roles allowed in; `None` admits any signed-in identity.
    pub fn allowed_roles(self) -> Option<&'static [Role]> {
        match self {
            Route::Admin => Some(&[Role::Admin]),
            Route::Dealer => Some(&[Role::Dealer]),
            _ => None,
        }
    }

    /// The sign-in page itself is open to everyone.
    pub fn requires_auth(self) -> bool {
        self != Route::Auth
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    Redirect(Route),
}

pub fn check_access(identity: Option<&Identity>, route: Route) -> Access {
    if !route.requires_auth() {
        return Access::Granted;
    }
    let Some(identity) = identity else {
        return Access::Redirect(Route::Auth);
    };
    match route.allowed_roles() {
        Some(roles) if !roles.contains(&identity.role) => Access::Redirect(Route::Home),
        _ => Access::Granted,
    }
}
