pub mod browser;
pub mod context;
pub mod error;
pub mod extract;
mod fetchers;
pub mod index;
pub mod resolver;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod throttle;

pub use browser::{BrowserLauncher, BrowserSession, BrowserlessLauncher};
pub use context::FetchContext;
pub use error::{ArchiveError, Result};
pub use extract::{RankingExtractor, StaticMarkupExtractor, StructuredApiExtractor};
pub use fetchers::CaptureSource;
pub use index::list_captures;
pub use resolver::{EraResolver, FallbackResolver, SnapshotResolver, Strategy};
pub use store::{CacheKey, FetchCache};
pub use throttle::RateLimiter;
pub use wayback_client::CaptureDescriptor;
