pub mod item;
pub mod ordering;

pub use item::Item;
pub use ordering::Ordering;
