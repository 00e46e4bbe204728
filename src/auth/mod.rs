//! Authentication module

pub mod api_key;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use api_key::{api_key_middleware, ApiKeyVerifier};
pub use jwt::{Claims, JwtService};
pub use middleware::{extract_token, jwt_auth_middleware, AuthContext};
pub use password::PasswordHasher;
