pub mod free_list;
pub mod pointer;
pub mod recency_list;
pub mod slots;

pub use free_list::FreeList;
pub use pointer::{Pointer, PointerWidth};
pub use recency_list::{RecencyIter, RecencyList};
pub use slots::SlotStorage;
