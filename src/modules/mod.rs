pub mod books;

use bookstore_db::Databases;
use bookstore_kernel::ModuleRegistry;

/// Register all service modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, db: &Databases) {
    registry.register(books::create_module(db));
}
