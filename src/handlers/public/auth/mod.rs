// handlers/public/auth/mod.rs - Public authentication handlers
//
// Token acquisition endpoints. Successful logins answer with both tokens in
// the body and as http-only cookies.

pub mod login;    // POST /login - verify credentials, mint access + refresh
pub mod logout;   // POST /logout - expire both session cookies
pub mod refresh;  // POST /refresh-token - new access token from the refresh cookie
pub mod register; // POST /register - create an account

pub use login::login_post;
pub use logout::logout_post;
pub use refresh::refresh_post;
pub use register::register_post;
