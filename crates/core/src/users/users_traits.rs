use crate::errors::Result;
use crate::users::users_model::{NewUser, ProfileUpdate, User};
use async_trait::async_trait;

/// Trait for user repository operations
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    fn get_by_id(&self, user_id: &str) -> Result<User>;
    /// Fails with `Error::ConstraintViolation` when the email is already registered.
    async fn create_user(&self, new_user: NewUser) -> Result<User>;
    /// Applies a normalized profile patch; `Error::NotFound` when the user is gone.
    async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<User>;
}
