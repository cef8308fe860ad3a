// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (Bearer access token, owner-scoped)
pub mod public;    // Registration, login, token refresh, logout, health
pub mod protected; // Account, notebooks and notes of the authenticated user
