//! Users module - account records used for authentication.

mod users_model;
mod users_traits;

pub use users_model::{NewUser, ProfileUpdate, User};
pub use users_traits::UserRepositoryTrait;
