pub mod selection;
#[cfg(feature = "clustering")]
pub mod clustering;
#[cfg(feature = "clustering")]
pub mod network;
#[cfg(feature = "clustering")]
pub mod local_moving;
mod utils;

pub use selection::{select_depth, ClusteredPcs, ClusteredPcsBuilder, SelectionError, SelectionResult, Trial};
pub use selection::oracle::{ClusterCount, LabelCount};
pub use utils::FloatOps;
