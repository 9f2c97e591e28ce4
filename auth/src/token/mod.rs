pub mod codec;
pub mod errors;
pub mod reset;
pub mod session;

pub use codec::TokenCodec;
pub use errors::TokenError;
pub use reset::ResetTokenService;
pub use session::SessionClaims;
pub use session::SessionTokenService;
