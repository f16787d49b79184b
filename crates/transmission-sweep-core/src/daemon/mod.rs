pub mod rpc;

pub use rpc::RpcClient;

use crate::error::Error;
use crate::model::RemoteTask;

/// Seam between the pipeline and the daemon transport.
///
/// The reconciler only ever sees normalized `RemoteTask` values, so tests
/// can drive the whole pipeline with an in-memory implementation.
pub trait TaskRegistry {
    /// The daemon's current task set. A failed query is fatal to the run;
    /// partial results are never returned.
    fn fetch_tasks(&self) -> Result<Vec<RemoteTask>, Error>;

    /// Remove tasks from the daemon's task list by id. `delete_data` also
    /// removes the downloaded payload on the daemon side.
    fn remove_tasks(&self, ids: &[i64], delete_data: bool) -> Result<(), Error>;
}
