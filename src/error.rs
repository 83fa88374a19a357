use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortfolioError {
    #[error("portfolio requires a display")]
    NullCollaborator,

    #[error("invalid amount {amount}: has to be greater than 0 and keep the holding within u64")]
    InvalidArgument { amount: i64 },

    #[error("total value of {portfolio} does not fit in a decimal")]
    TotalOverflow { portfolio: String },
}

/// Errors raised while loading or running a scenario.
#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("failed to read scenario file: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to parse scenario: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("unknown stock '{name}' referenced by {context}")]
    UnknownStock { name: String, context: String },

    #[error("stock '{0}' is declared more than once")]
    DuplicateStock(String),

    #[error("portfolio '{0}' is declared more than once")]
    DuplicatePortfolio(String),

    #[error(transparent)]
    Portfolio(#[from] PortfolioError),
}
