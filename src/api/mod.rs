mod error;
mod handlers;
mod middleware;
mod router;
mod types;

pub use error::{ApiError, ApiResult};
pub use middleware::REQUEST_ID_HEADER;
pub use router::build_router;
pub use types::AppState;
