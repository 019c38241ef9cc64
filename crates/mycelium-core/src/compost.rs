//! Compost source: the external feed of decaying memories.

use crate::error::Result;
use crate::types::DecayingItem;

/// Pull-based access to items that are degrading elsewhere in the host.
///
/// There is no push contract: the simulation asks on its own schedule.
/// An `Err` means the source is unavailable for this cycle only.
pub trait CompostSource {
    fn list_decaying_items(&self) -> Result<Vec<DecayingItem>>;
}

impl CompostSource for Vec<DecayingItem> {
    fn list_decaying_items(&self) -> Result<Vec<DecayingItem>> {
        Ok(self.clone())
    }
}

impl<F> CompostSource for F
where
    F: Fn() -> Result<Vec<DecayingItem>>,
{
    fn list_decaying_items(&self) -> Result<Vec<DecayingItem>> {
        self()
    }
}
