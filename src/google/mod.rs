pub mod auth;
pub mod error;
#[cfg(test)]
pub mod test_server;

pub use auth::ServiceAccountAuth;
pub use error::AuthError;
