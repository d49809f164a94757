use crate::{jwt::SessionData, schema::UserRole};

const ACTION_TABLE: &[(UserRole, &[ActionType])] = &[
    (
        UserRole::User,
        &[
            ActionType::CreateRecipes,
            ActionType::ManageOwnRecipes,
            ActionType::ManageOwnMemberships,
        ],
    ),
    (
        UserRole::Admin,
        &[
            ActionType::CreateRecipes,
            ActionType::ManageOwnRecipes,
            ActionType::ManageOwnMemberships,
            ActionType::ManageCatalog,
            ActionType::ManageUsers,
            ActionType::ManageAllRecipes,
        ],
    ),
];

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum ActionType {
    CreateRecipes,

    ManageOwnRecipes,
    ManageOwnMemberships,

    ManageCatalog,
    ManageUsers,
    ManageAllRecipes,
}

impl ActionType {
    pub fn authenticate(self, session: &SessionData) -> bool {
        let role = &session.role;

        ACTION_TABLE
            .iter()
            .find_map(|(table_role, actions)| {
                if role != table_role {
                    return None;
                }

                Some(actions.contains(&self))
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: UserRole) -> SessionData {
        SessionData {
            user_id: 1,
            username: String::from("chef"),
            role,
            is_admin: role == UserRole::Admin,
        }
    }

    #[test]
    fn users_cannot_manage_the_catalog() {
        let session = session(UserRole::User);
        assert!(ActionType::CreateRecipes.authenticate(&session));
        assert!(ActionType::ManageOwnMemberships.authenticate(&session));
        assert!(!ActionType::ManageCatalog.authenticate(&session));
        assert!(!ActionType::ManageAllRecipes.authenticate(&session));
    }

    #[test]
    fn admins_can_do_everything() {
        let session = session(UserRole::Admin);
        assert!(ActionType::ManageCatalog.authenticate(&session));
        assert!(ActionType::ManageUsers.authenticate(&session));
        assert!(ActionType::ManageAllRecipes.authenticate(&session));
    }
}
