pub mod poster_resolver;
pub mod providers;
pub mod recommendations;
pub mod transport;

pub use poster_resolver::{PosterResolver, WarmReport};
pub use transport::{HttpTransport, ReqwestTransport, RetryPolicy, RetryingClient};
