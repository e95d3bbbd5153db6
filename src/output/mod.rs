pub mod dto;
pub mod writer;
