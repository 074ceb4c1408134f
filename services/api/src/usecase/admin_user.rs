use uuid::Uuid;

use crate::domain::repository::UserRepository;
use crate::error::ApiError;

/// Remove an account. Session tokens referencing it keep a valid signature
/// but fail the per-request account check from then on.
pub struct DeleteUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> DeleteUserUseCase<U> {
    pub async fn execute(&self, user_id: Uuid) -> Result<(), ApiError> {
        if !self.users.delete(user_id).await? {
            return Err(ApiError::UserNotFound);
        }
        Ok(())
    }
}
