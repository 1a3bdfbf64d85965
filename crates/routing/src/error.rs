#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("bot_list[{index}] has an empty or blank keyword")]
    EmptyKeyword { index: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
