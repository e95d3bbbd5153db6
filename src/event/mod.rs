pub mod dates;
pub mod model;
pub mod normalizer;
pub mod pipeline;
