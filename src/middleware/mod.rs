pub mod authentication;
pub mod authorization;
pub mod response;

pub use authentication::{authenticate, Authentication};
pub use authorization::authorize;
pub use response::{ApiResponse, ApiResult};
