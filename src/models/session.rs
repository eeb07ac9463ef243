//! session.rs
//!
//! Роли и таблица прав доступа.
//!
//! Роль приходит строкой из токена, но дальше по коду ходит только закрытый
//! `Role`. Набор прав (`Permissions`) считается один раз при создании сессии,
//! а сама `Session` явно передаётся в обработчики и сервисы.

use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    Agent,
    User,
    Guest,
}

impl Role {
    /// Неизвестная роль получает минимальные права.
    pub fn from_claim(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" | "superadmin" | "super_admin" => Role::Admin,
            "staff" | "operator" | "manager" => Role::Staff,
            "agent" => Role::Agent,
            "user" | "customer" | "passenger" => Role::User,
            _ => Role::Guest,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    Schedules,
    Buses,
    Bookings,
    GuestBookings,
    FrozenSeats,
    Cancellations,
    Loyalty,
    Commissions,
    Reports,
    Users,
}

impl Module {
    pub const ALL: [Module; 10] = [
        Module::Schedules,
        Module::Buses,
        Module::Bookings,
        Module::GuestBookings,
        Module::FrozenSeats,
        Module::Cancellations,
        Module::Loyalty,
        Module::Commissions,
        Module::Reports,
        Module::Users,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    View,
    Create,
    Update,
    Delete,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::View, Action::Create, Action::Update, Action::Delete];
    const WRITE: [Action; 3] = [Action::Create, Action::Update, Action::Delete];
}

/// Таблица `модуль x действие -> разрешено`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Permissions {
    granted: HashSet<(Module, Action)>,
}

impl Permissions {
    pub fn for_role(role: Role) -> Self {
        let mut p = Self::default();
        match role {
            Role::Admin => {
                for module in Module::ALL {
                    p.grant(module, &Action::ALL);
                }
            }
            Role::Staff => {
                for module in Module::ALL.into_iter().filter(|m| *m != Module::Users) {
                    p.grant(module, &[Action::View]);
                }
                for module in [
                    Module::Schedules,
                    Module::Buses,
                    Module::Bookings,
                    Module::GuestBookings,
                    Module::FrozenSeats,
                    Module::Cancellations,
                ] {
                    p.grant(module, &Action::WRITE);
                }
            }
            Role::Agent => {
                for module in [
                    Module::Schedules,
                    Module::Buses,
                    Module::Bookings,
                    Module::GuestBookings,
                    Module::Commissions,
                    Module::Loyalty,
                ] {
                    p.grant(module, &[Action::View]);
                }
                p.grant(Module::Bookings, &Action::WRITE);
                p.grant(Module::GuestBookings, &Action::WRITE);
                p.grant(Module::Cancellations, &[Action::Create]);
            }
            Role::User => {
                for module in [Module::Schedules, Module::Buses, Module::Bookings, Module::Loyalty] {
                    p.grant(module, &[Action::View]);
                }
                p.grant(Module::Bookings, &Action::WRITE);
                p.grant(Module::Cancellations, &[Action::Create]);
            }
            Role::Guest => {
                p.grant(Module::Schedules, &[Action::View]);
                p.grant(Module::Buses, &[Action::View]);
                p.grant(Module::GuestBookings, &[Action::Create]);
            }
        }
        p
    }

    fn grant(&mut self, module: Module, actions: &[Action]) {
        self.granted.extend(actions.iter().map(|action| (module, *action)));
    }

    pub fn allows(&self, module: Module, action: Action) -> bool {
        self.granted.contains(&(module, action))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub id: String,
    pub name: Option<String>,
    pub role: Role,
}

/// Текущая сессия. Токен пробрасывается в бэкенд как есть.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: SessionUser,
    pub permissions: Permissions,
    pub token: String,
}

impl Session {
    pub fn new(user: SessionUser, token: impl Into<String>) -> Self {
        let permissions = Permissions::for_role(user.role);
        Self {
            user,
            permissions,
            token: token.into(),
        }
    }

    pub fn allows(&self, module: Module, action: Action) -> bool {
        self.permissions.allows(module, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_claims_are_normalized() {
        assert_eq!(Role::from_claim("Admin"), Role::Admin);
        assert_eq!(Role::from_claim(" operator "), Role::Staff);
        assert_eq!(Role::from_claim("agent"), Role::Agent);
        assert_eq!(Role::from_claim("customer"), Role::User);
        assert_eq!(Role::from_claim("root"), Role::Guest);
    }

    #[test]
    fn admin_can_do_everything() {
        let p = Permissions::for_role(Role::Admin);
        for module in Module::ALL {
            for action in Action::ALL {
                assert!(p.allows(module, action), "{module:?} {action:?}");
            }
        }
    }

    #[test]
    fn staff_manages_seats_but_not_users() {
        let p = Permissions::for_role(Role::Staff);
        assert!(p.allows(Module::FrozenSeats, Action::Create));
        assert!(p.allows(Module::Reports, Action::View));
        assert!(!p.allows(Module::Reports, Action::Delete));
        assert!(!p.allows(Module::Users, Action::View));
    }

    #[test]
    fn agent_and_user_limits() {
        let agent = Permissions::for_role(Role::Agent);
        assert!(agent.allows(Module::Commissions, Action::View));
        assert!(agent.allows(Module::Cancellations, Action::Create));
        assert!(!agent.allows(Module::Cancellations, Action::Delete));
        assert!(!agent.allows(Module::Reports, Action::View));
        assert!(!agent.allows(Module::FrozenSeats, Action::Create));

        let user = Permissions::for_role(Role::User);
        assert!(user.allows(Module::Bookings, Action::View));
        assert!(!user.allows(Module::Commissions, Action::View));
        assert!(!user.allows(Module::GuestBookings, Action::Create));
    }

    #[test]
    fn guest_only_browses_and_books_as_guest() {
        let session = Session::new(
            SessionUser { id: "anon".into(), name: None, role: Role::Guest },
            "t",
        );
        assert!(session.allows(Module::Schedules, Action::View));
        assert!(session.allows(Module::GuestBookings, Action::Create));
        assert!(!session.allows(Module::Bookings, Action::View));
    }
}
