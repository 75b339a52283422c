//! Authentication against the external identity provider.
//!
//! This module provides:
//! - the `AuthProvider` boundary and its Supabase implementation
//! - optional local JWT validation of access tokens
//! - `require_auth` middleware for protecting routes
//! - token, refresh, verify and signup handlers

mod handlers;
mod jwt;
mod middleware;
mod provider;
mod supabase;
pub mod types;

pub use handlers::{create_account, get_token, refresh_token, verify_token};
pub use jwt::JwtVerifier;
pub use middleware::{extract_bearer_token, require_auth};
pub use provider::{AuthError, AuthProvider};
pub use supabase::SupabaseAuth;
pub use types::{AuthUser, NewAccount, TokenPair};
