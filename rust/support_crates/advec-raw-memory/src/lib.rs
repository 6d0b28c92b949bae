pub mod raw_memory;

pub use raw_memory::RawMemory;
