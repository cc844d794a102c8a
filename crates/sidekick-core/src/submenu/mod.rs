mod fallback;
mod item;
pub mod paths;
mod refresher;
mod registry;
mod store;

pub use fallback::{dedup_by_id, FallbackStore};
pub use item::{ProviderState, SearchResult, SubmenuContextItem, SubmenuItem, SubmenuTarget};
pub use refresher::OpenFilesRefresher;
pub use registry::SubmenuContextProviders;
pub use store::ProviderStore;
