pub mod dto;
pub mod util;
