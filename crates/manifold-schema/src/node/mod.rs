mod child_table;
mod entity;
mod field;
mod permission;

pub use child_table::ChildTable;
pub use entity::{Classification, EntityDescriptor, EntitySchema};
pub use field::{FieldDescriptor, FieldUi};
pub use permission::PermissionSeed;
