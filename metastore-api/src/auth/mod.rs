mod extractor;
mod token;

pub use extractor::{Caller, TOKEN_HEADER, TOKEN_PARAM};
pub use token::TokenDecoder;
