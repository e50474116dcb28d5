pub mod claims;
pub mod codec;
pub mod errors;

pub use claims::SessionClaims;
pub use codec::JwtCodec;
pub use codec::Verification;
pub use errors::JwtError;
