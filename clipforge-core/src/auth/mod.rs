//! Credential and session lifecycle: password hashing, the two-class token
//! codec, and the session state machine built on them.

pub mod crypto;
pub mod session;
pub mod token;

pub use crypto::{CryptoError, PasswordCrypto};
pub use session::{
    ACCESS_COOKIE, CookieSpec, LoginOutcome, REFRESH_COOKIE, SessionService,
};
pub use token::{Claims, CodecError, TokenClass, TokenCodec, TokenPair};
