pub mod api_error;
pub mod password;
pub mod validation;

pub use api_error::ApiError;
pub use password::{hash_password, verify_password, PasswordError};
pub use validation::{
    age_in_years, validate_adult, validate_description, validate_password, validate_phone,
};
