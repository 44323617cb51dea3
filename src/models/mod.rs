/*!
Data models for the stream surface and the aggregation pipeline.
*/
mod elem;
mod peer;
mod record;

pub use elem::*;
pub use peer::*;
pub use record::*;
