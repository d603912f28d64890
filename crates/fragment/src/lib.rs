pub mod errors;
pub mod identity;
pub mod normalize;
pub mod schema;

pub use errors::{PipelineError, Result};
pub use identity::IdentityResolver;
pub use normalize::{PLACEHOLDER_TYPE, normalize};
pub use schema::{GraphFragment, Node, Properties, Relationship};
