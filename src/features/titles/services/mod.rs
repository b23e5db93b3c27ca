mod title_service;

pub use title_service::TitleService;

#[cfg(test)]
pub use title_service::TitleKey;
