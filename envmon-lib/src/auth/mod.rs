//! Authentication
//!
//! Sign-in and role resolution live outside this crate. The client only needs
//! something that hands it a bearer token before each request.

mod token;

pub use token::AccessToken;
pub use token::StaticTokenProvider;
pub use token::TokenProvider;
