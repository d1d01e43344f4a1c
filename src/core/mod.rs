pub mod mem;
pub mod proc;
pub mod scan;
pub mod utils;
pub mod value;
