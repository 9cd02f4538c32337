pub mod filter;
pub mod memory;
pub mod port;

pub use filter::{DateField, GroupKey, TaskFilter};
pub use memory::InMemoryTaskStore;
pub use port::{TaskQueryPort, UserLookup};
