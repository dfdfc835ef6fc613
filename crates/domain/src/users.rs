//! Users and bearer-token authentication.

use std::sync::Arc;

use common::{Role, UserId};
use storage::{NewUser, Store, User};
use uuid::Uuid;

use crate::{Actor, DomainError};

/// A newly created user together with the token they authenticate with.
#[derive(Debug, Clone)]
pub struct IssuedUser {
    pub user: User,
    pub api_token: String,
}

#[derive(Debug, Clone)]
pub struct UserInput {
    pub name: String,
    pub email: String,
    pub role: Role,
}

pub struct UserService<S: Store> {
    store: Arc<S>,
}

impl<S: Store> UserService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Resolves a bearer token to the caller it belongs to.
    pub async fn authenticate(&self, token: &str) -> Result<Actor, DomainError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(DomainError::Unauthenticated);
        }
        let user = self
            .store
            .find_user_by_token(token)
            .await?
            .ok_or(DomainError::Unauthenticated)?;
        Ok(Actor::new(user.id, user.role))
    }

    #[tracing::instrument(skip(self))]
    pub async fn list(&self, actor: &Actor) -> Result<Vec<User>, DomainError> {
        actor.require_admin()?;
        Ok(self.store.list_users().await?)
    }

    /// Creates a user and issues a fresh token. Admin only.
    #[tracing::instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create(&self, actor: &Actor, input: UserInput) -> Result<IssuedUser, DomainError> {
        actor.require_admin()?;

        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("The name field is required."));
        }
        let email = input.email.trim().to_lowercase();
        if !is_plausible_email(&email) {
            return Err(DomainError::validation(
                "The email must be a valid email address.",
            ));
        }

        let api_token = Uuid::new_v4().simple().to_string();
        let user = self
            .store
            .insert_user(NewUser {
                name,
                email,
                role: input.role,
                api_token: api_token.clone(),
            })
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User created");
        Ok(IssuedUser { user, api_token })
    }

    /// Grants or revokes the admin role. Admin only.
    #[tracing::instrument(skip(self))]
    pub async fn set_role(
        &self,
        actor: &Actor,
        user_id: UserId,
        role: Role,
    ) -> Result<User, DomainError> {
        actor.require_admin()?;
        self.store
            .set_user_role(user_id, role)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))
    }

    /// Makes sure an admin authenticated by `token` exists, creating or
    /// promoting it as needed.
    pub async fn ensure_admin(&self, email: &str, token: &str) -> Result<User, DomainError> {
        if let Some(user) = self.store.find_user_by_token(token).await? {
            if user.role.is_admin() {
                return Ok(user);
            }
            return self
                .store
                .set_user_role(user.id, Role::Admin)
                .await?
                .ok_or_else(|| DomainError::not_found("User", user.id));
        }

        let user = self
            .store
            .insert_user(NewUser {
                name: "Administrator".to_string(),
                email: email.to_string(),
                role: Role::Admin,
                api_token: token.to_string(),
            })
            .await?;
        tracing::info!(user_id = %user.id, "Bootstrap admin created");
        Ok(user)
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::InMemoryStore;

    fn service() -> UserService<InMemoryStore> {
        UserService::new(Arc::new(InMemoryStore::new()))
    }

    #[tokio::test]
    async fn issued_token_authenticates() {
        let users = service();
        let admin = users.ensure_admin("admin@example.com", "root-token").await.unwrap();
        let admin = Actor::new(admin.id, admin.role);

        let issued = users
            .create(
                &admin,
                UserInput {
                    name: "Bo".into(),
                    email: "Bo@Example.com".into(),
                    role: Role::User,
                },
            )
            .await
            .unwrap();
        assert_eq!(issued.user.email, "bo@example.com");

        let actor = users.authenticate(&issued.api_token).await.unwrap();
        assert_eq!(actor.user_id, issued.user.id);
        assert!(!actor.is_admin());
    }

    #[tokio::test]
    async fn unknown_or_blank_token_is_unauthenticated() {
        let users = service();
        assert!(matches!(
            users.authenticate("nope").await,
            Err(DomainError::Unauthenticated)
        ));
        assert!(matches!(
            users.authenticate("  ").await,
            Err(DomainError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn ensure_admin_is_idempotent() {
        let users = service();
        let first = users.ensure_admin("admin@example.com", "t").await.unwrap();
        let second = users.ensure_admin("admin@example.com", "t").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(users.list(&Actor::admin(first.id)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn only_admins_manage_users() {
        let users = service();
        let actor = Actor::user(UserId::new());
        assert!(matches!(users.list(&actor).await, Err(DomainError::Forbidden)));
        assert!(matches!(
            users.set_role(&actor, UserId::new(), Role::Admin).await,
            Err(DomainError::Forbidden)
        ));
    }

    #[test]
    fn email_plausibility() {
        assert!(is_plausible_email("a@b.co"));
        assert!(!is_plausible_email("a@b"));
        assert!(!is_plausible_email("@b.co"));
        assert!(!is_plausible_email("plain"));
    }
}
