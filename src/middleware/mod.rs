pub mod extract;
pub mod response;
pub mod session;

pub use extract::{ApiJson, ApiPath, ApiQuery};
pub use response::{ApiResponse, ApiResult, Deleted, Keyed, Listing};
pub use session::{session_middleware, Session};
