mod taxon_dto;

pub use taxon_dto::*;
