pub mod geojson;
pub mod merge;
pub mod records;
pub mod registry;
pub mod search;

pub use geojson::*;
pub use merge::*;
pub use records::*;
pub use registry::*;
