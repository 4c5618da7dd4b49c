pub mod endpoint;
pub mod fleet;
pub mod query;
pub mod routing;

pub use endpoint::*;
pub use fleet::*;
pub use query::*;
pub use routing::*;
