pub mod chunk;
pub mod context;
pub mod expansion;
pub mod retrieval;
pub mod snapshot;
