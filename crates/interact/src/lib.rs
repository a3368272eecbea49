pub mod drag;
pub mod floors;
pub mod group;
pub mod hover;

pub use drag::*;
pub use floors::*;
pub use group::*;
pub use hover::*;
