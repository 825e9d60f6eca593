//! Authentication module
//!
//! Session tokens are HMAC-signed JWTs; passwords are hashed with bcrypt or
//! argon2id; password resets use random single-use tokens.

mod error;
mod jwt;
mod middleware;
mod password;
mod reset;

pub use error::{AuthError, AuthResult};
pub use jwt::{Claims, JwtKeys, JwtService};
pub use middleware::{bearer_token, AuthUser};
pub use password::PasswordService;
pub use reset::{generate_token, MIN_TOKEN_BYTES};
