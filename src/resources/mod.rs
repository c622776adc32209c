// Access objects for the primary API
// One per resource family; each call is a single request through the
// bearer-authenticated client, with failures normalized per resource.

mod categories;
mod expenses;

pub use categories::CategoryService;
pub use expenses::ExpenseService;
