use crate::domain::access::Gate;
use crate::domain::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub label: &'static str,
    pub key: &'static str,
    pub show_in_menu: bool,
    pub private: bool,
    pub gate: Gate,
    pub children: &'static [Route],
}

impl Route {
    const fn private(
        path: &'static str,
        label: &'static str,
        key: &'static str,
        gate: Gate,
    ) -> Self {
        Route {
            path,
            label,
            key,
            show_in_menu: true,
            private: true,
            gate,
            children: &[],
        }
    }

    const fn with_children(self, children: &'static [Route]) -> Self {
        Route { children, ..self }
    }

    fn visible_to(&self, session: Option<&Session>) -> bool {
        match session {
            Some(session) => self.gate.allows(session),
            None => !self.private,
        }
    }
}

pub static ROUTES: &[Route] = &[
    Route::private("/dashboard", "Dashboard", "dashboard", Gate::ADMIN_OR_STAFF),
    Route::private("/customers", "Customers", "customers", Gate::OPEN),
    Route::private(
        "/orders",
        "Orders",
        "orders",
        Gate::ADMIN_OR_STAFF.with_permissions(&["order.view"]),
    ),
    Route {
        path: "/login",
        label: "Login",
        key: "login",
        show_in_menu: false,
        private: false,
        gate: Gate::OPEN,
        children: &[],
    },
    Route::private(
        "/products",
        "Products",
        "products",
        Gate::ADMIN_OR_STAFF.with_permissions(&["product.view"]),
    ),
    Route::private(
        "/brands",
        "Brands",
        "brands",
        Gate::ADMIN_OR_STAFF.with_permissions(&["brand.view"]),
    ),
    Route::private(
        "/categories",
        "Categories",
        "categories",
        Gate::ADMIN_OR_STAFF.with_permissions(&["category.view"]),
    ),
    Route::private(
        "/discounts",
        "Discounts",
        "discounts",
        Gate::ADMIN_OR_STAFF.with_permissions(&["discount.view"]),
    ),
    Route::private(
        "/roles",
        "Roles",
        "roles",
        Gate::ADMIN.with_permissions(&["role.view"]),
    ),
    Route::private(
        "/administrators",
        "Administrators",
        "administrators",
        Gate::ADMIN.with_permissions(&["roles.view", "users.view"]),
    )
    .with_children(ADMINISTRATOR_ROUTES),
];

static ADMINISTRATOR_ROUTES: &[Route] = &[Route::private(
    "/administrators/users",
    "Users",
    "administrators-users",
    Gate::ADMIN.with_permissions(&["users.view"]),
)];

/// A menu entry with its children already filtered for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub path: &'static str,
    pub label: &'static str,
    pub key: &'static str,
    pub children: Vec<MenuItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    Allowed(&'static Route),
    LoginRequired,
    Forbidden,
    NotFound,
}

pub fn menu_for(session: &Session) -> Vec<MenuItem> {
    menu_level(ROUTES, session)
}

fn menu_level(routes: &'static [Route], session: &Session) -> Vec<MenuItem> {
    routes
        .iter()
        .filter(|r| r.show_in_menu && r.visible_to(Some(session)))
        .map(|r| MenuItem {
            path: r.path,
            label: r.label,
            key: r.key,
            children: menu_level(r.children, session),
        })
        .collect()
}

/// Decides what navigating to `path` does. A nested route also needs its
/// parents' gates.
pub fn resolve(path: &str, session: Option<&Session>) -> RouteAccess {
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };
    let Some(chain) = find(ROUTES, path) else {
        return RouteAccess::NotFound;
    };
    let Some(route) = chain.last().copied() else {
        return RouteAccess::NotFound;
    };
    if !chain.iter().any(|r| r.private) {
        return RouteAccess::Allowed(route);
    }
    match session {
        None => RouteAccess::LoginRequired,
        Some(session) if chain.iter().all(|r| r.gate.allows(session)) => {
            RouteAccess::Allowed(route)
        }
        Some(_) => RouteAccess::Forbidden,
    }
}

fn find(routes: &'static [Route], path: &str) -> Option<Vec<&'static Route>> {
    for route in routes {
        if route.path == path {
            return Some(vec![route]);
        }
        if let Some(mut rest) = find(route.children, path) {
            rest.insert(0, route);
            return Some(rest);
        }
    }
    None
}

/// Menu keys encode nesting with `-`: `administrators-users` is
/// `administrators/users`.
pub fn generate_path(key: &str) -> String {
    key.split('-').collect::<Vec<_>>().join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserRole;

    fn session(roles: Vec<UserRole>, permissions: &[&str]) -> Session {
        Session {
            token: "t".into(),
            user_id: "u-1".into(),
            email: "ops@example.com".into(),
            display_name: "Ops".into(),
            roles,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn keys(items: &[MenuItem]) -> Vec<&'static str> {
        items.iter().map(|i| i.key).collect()
    }

    #[test]
    fn staff_menu_hides_admin_sections() {
        let staff = session(vec![UserRole::Staff], &["order.view", "brand.view"]);
        assert_eq!(
            keys(&menu_for(&staff)),
            vec!["dashboard", "customers", "orders", "brands"]
        );
    }

    #[test]
    fn children_are_filtered_on_their_own_gate() {
        let admin = session(vec![UserRole::Admin], &["roles.view"]);
        let menu = menu_for(&admin);
        let admins = menu.iter().find(|i| i.key == "administrators").unwrap();
        assert!(admins.children.is_empty());

        let admin = session(vec![UserRole::Admin], &["users.view"]);
        let menu = menu_for(&admin);
        let admins = menu.iter().find(|i| i.key == "administrators").unwrap();
        assert_eq!(keys(&admins.children), vec!["administrators-users"]);
    }

    #[test]
    fn login_never_appears_in_the_menu() {
        let admin = session(vec![UserRole::Admin], &[]);
        assert!(!keys(&menu_for(&admin)).contains(&"login"));
    }

    #[test]
    fn resolve_covers_every_outcome() {
        let staff = session(vec![UserRole::Staff], &["product.view"]);
        assert!(matches!(resolve("/login", None), RouteAccess::Allowed(r) if r.key == "login"));
        assert_eq!(resolve("/products", None), RouteAccess::LoginRequired);
        assert!(matches!(resolve("/products/", Some(&staff)), RouteAccess::Allowed(_)));
        assert_eq!(resolve("/roles", Some(&staff)), RouteAccess::Forbidden);
        assert_eq!(resolve("/nowhere", Some(&staff)), RouteAccess::NotFound);
    }

    #[test]
    fn nested_routes_need_the_parent_gate_too() {
        let only_users = session(vec![UserRole::Admin], &["users.view"]);
        assert!(matches!(
            resolve("/administrators/users", Some(&only_users)),
            RouteAccess::Allowed(r) if r.label == "Users"
        ));
        let staff = session(vec![UserRole::Staff], &["users.view"]);
        assert_eq!(
            resolve("/administrators/users", Some(&staff)),
            RouteAccess::Forbidden
        );
    }

    #[test]
    fn keys_map_to_paths() {
        assert_eq!(generate_path("administrators-users"), "administrators/users");
        assert_eq!(generate_path("orders"), "orders");
    }
}
