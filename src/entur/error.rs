#[derive(thiserror::Error, Debug)]
pub enum EnturError {
    #[error("Init error: {0}")]
    Init(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Deserialize error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("Error response: {0} {1}")]
    Status(u16, String),

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("Response had no data")]
    MissingData,

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type EnturResult<T> = Result<T, EnturError>;
