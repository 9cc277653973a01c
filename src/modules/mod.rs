pub mod bookings;

use std::sync::Arc;

use staybook_db::RecordStore;
use staybook_kernel::ModuleRegistry;

/// Register all application modules with the registry
pub fn register_all(
    registry: &mut ModuleRegistry,
    store: Arc<dyn RecordStore>,
) -> anyhow::Result<()> {
    registry.register(bookings::create_module(store))?;
    Ok(())
}
