//! Search engine implementations.

mod elastic;
#[cfg(test)]
mod mock;

pub use elastic::ElasticSearchEngine;
#[cfg(test)]
pub use mock::MockSearchEngine;
