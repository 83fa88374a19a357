pub mod display;
pub mod error;
pub mod observer;
pub mod portfolio;
pub mod scenario;
pub mod stock;

pub use display::{describe_change, ConsoleDisplay, PortfolioDisplay, PortfolioTable, SilentDisplay};
pub use error::{PortfolioError, ScenarioError};
pub use observer::{Observer, ObserverId, Subject};
pub use portfolio::{Addition, Holding, Portfolio, Removal};
pub use scenario::{Market, PortfolioSummary, Scenario};
pub use stock::Stock;
