mod audit;
mod auth;

pub use audit::AuditLog;
pub use auth::AppTokenManager;
pub use auth::TokenManager;
