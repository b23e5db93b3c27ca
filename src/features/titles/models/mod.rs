mod title;

pub use title::{TitleGenre, TitleRow};
