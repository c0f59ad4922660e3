pub mod approval;
pub mod compact;
pub mod utils;
