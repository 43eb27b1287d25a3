mod object;
mod store;

pub use object::GameObject;
pub use store::World;
