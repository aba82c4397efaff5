mod factgraph_error;
mod store_error;
mod validation_error;

pub use factgraph_error::{FactGraphError, FactGraphResult};
pub use store_error::StoreError;
pub use validation_error::ValidationError;
