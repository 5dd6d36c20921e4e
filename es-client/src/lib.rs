mod client;
mod es_url;
pub mod response;

pub use client::*;
pub use es_url::*;
pub use response::SearchResponse;
