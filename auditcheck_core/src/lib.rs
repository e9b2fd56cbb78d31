pub mod dedupe;
pub mod differ;
pub mod loader;
pub mod normalize;
pub mod reconciler;

pub use dedupe::{dedupe, Deduped, KeyIndex};
pub use differ::{diff, Diff, B_SUFFIX};
pub use loader::{is_supported_file, load_table, TableFormat};
pub use normalize::{normalize, normalize_value};
pub use reconciler::{reconcile, shared_columns, Reconciler};
