mod title_dto;

pub use title_dto::*;
