//! Row-level authorization.
//!
//! Every handler asks [`Policy::decide`] before touching the store and
//! threads the resulting [`RowFilter`] into the same query that reads or
//! writes, so ownership is checked atomically with the data access.

use crate::auth::Session;
use crate::config::UserAdminAccess;

/// Operations a request can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ListPokemon,
    ViewPokemon,
    SearchPokemon,
    CreatePokemon,
    UpdatePokemon,
    DeletePokemon,
    SearchPokedex,
    ManageUsers,
}

impl Action {
    fn is_pokemon(&self) -> bool {
        matches!(
            self,
            Action::ListPokemon
                | Action::ViewPokemon
                | Action::SearchPokemon
                | Action::CreatePokemon
                | Action::UpdatePokemon
                | Action::DeletePokemon
        )
    }
}

/// Restricts rows to those owned by `trainer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFilter {
    pub trainer: String,
}

impl RowFilter {
    pub fn matches(&self, trainer: &str) -> bool {
        self.trainer == trainer
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Deny,
    AllowAll,
    AllowFiltered(RowFilter),
}

/// Marker for a refused decision; handlers turn it into a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Denied;

impl Decision {
    /// `Ok(None)` for unrestricted access, `Ok(Some(filter))` for scoped access.
    pub fn permit(self) -> Result<Option<RowFilter>, Denied> {
        match self {
            Decision::Deny => Err(Denied),
            Decision::AllowAll => Ok(None),
            Decision::AllowFiltered(filter) => Ok(Some(filter)),
        }
    }
}

/// Owner to write on create: scoped sessions always own what they create,
/// unrestricted ones may name any trainer (falling back to themselves).
pub fn owner_for_create(scope: Option<&RowFilter>, requested: Option<&str>, session: &Session) -> Option<String> {
    if let Some(filter) = scope {
        return Some(filter.trainer.clone());
    }
    requested
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .or_else(|| session.username())
        .map(str::to_string)
}

#[derive(Debug, Clone, Copy)]
pub struct Policy {
    user_admin: UserAdminAccess,
}

impl Policy {
    pub fn new(user_admin: UserAdminAccess) -> Self {
        Self { user_admin }
    }

    pub fn decide(&self, session: &Session, action: Action) -> Decision {
        if action == Action::SearchPokedex {
            return Decision::AllowAll;
        }

        let Session::Authenticated { username, level, .. } = session else {
            return Decision::Deny;
        };

        if level.is_manager() {
            return Decision::AllowAll;
        }

        if action.is_pokemon() {
            return Decision::AllowFiltered(RowFilter { trainer: username.clone() });
        }

        match self.user_admin {
            UserAdminAccess::AnyAuthenticated => Decision::AllowAll,
            UserAdminAccess::ManagerOnly => Decision::Deny,
        }
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::new(UserAdminAccess::ManagerOnly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Level;

    const POKEMON_ACTIONS: [Action; 6] = [
        Action::ListPokemon,
        Action::ViewPokemon,
        Action::SearchPokemon,
        Action::CreatePokemon,
        Action::UpdatePokemon,
        Action::DeletePokemon,
    ];

    fn user(name: &str) -> Session {
        Session::Authenticated { id: "sid".into(), username: name.into(), level: Level::User }
    }

    fn manager(name: &str) -> Session {
        Session::Authenticated { id: "sid".into(), username: name.into(), level: Level::Manager }
    }

    #[test]
    fn anonymous_is_denied_everything_but_pokedex() {
        let policy = Policy::default();
        for action in POKEMON_ACTIONS.into_iter().chain([Action::ManageUsers]) {
            assert_eq!(policy.decide(&Session::Anonymous, action), Decision::Deny, "{:?}", action);
        }
        assert_eq!(policy.decide(&Session::Anonymous, Action::SearchPokedex), Decision::AllowAll);
    }

    #[test]
    fn regular_user_is_scoped_to_own_rows() {
        let policy = Policy::default();
        for action in POKEMON_ACTIONS {
            assert_eq!(
                policy.decide(&user("misty"), action),
                Decision::AllowFiltered(RowFilter { trainer: "misty".into() })
            );
        }
    }

    #[test]
    fn manager_is_unrestricted() {
        let policy = Policy::default();
        for action in POKEMON_ACTIONS.into_iter().chain([Action::ManageUsers, Action::SearchPokedex]) {
            assert_eq!(policy.decide(&manager("oak"), action), Decision::AllowAll);
        }
    }

    #[test]
    fn user_admin_follows_configured_access() {
        let restricted = Policy::new(UserAdminAccess::ManagerOnly);
        assert_eq!(restricted.decide(&user("misty"), Action::ManageUsers), Decision::Deny);

        let open = Policy::new(UserAdminAccess::AnyAuthenticated);
        assert_eq!(open.decide(&user("misty"), Action::ManageUsers), Decision::AllowAll);
        assert_eq!(open.decide(&Session::Anonymous, Action::ManageUsers), Decision::Deny);
    }

    #[test]
    fn create_owner_is_forced_for_scoped_sessions() {
        let scope = RowFilter { trainer: "misty".into() };
        assert_eq!(
            owner_for_create(Some(&scope), Some("brock"), &user("misty")),
            Some("misty".to_string())
        );
        assert_eq!(
            owner_for_create(None, Some(" brock "), &manager("oak")),
            Some("brock".to_string())
        );
        assert_eq!(owner_for_create(None, Some(""), &manager("oak")), Some("oak".to_string()));
    }

    #[test]
    fn permit_maps_decisions() {
        assert_eq!(Decision::Deny.permit(), Err(Denied));
        assert_eq!(Decision::AllowAll.permit(), Ok(None));
        let filter = RowFilter { trainer: "ash".into() };
        assert_eq!(Decision::AllowFiltered(filter.clone()).permit(), Ok(Some(filter)));
    }
}
