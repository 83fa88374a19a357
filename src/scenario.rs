use std::{collections::HashSet, path::Path, rc::Rc};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    display::PortfolioDisplay,
    error::{PortfolioError, ScenarioError},
    portfolio::Portfolio,
    stock::Stock,
};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StockSpec {
    pub name: String,
    pub value: Decimal,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HoldingSpec {
    pub stock: String,
    pub amount: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PortfolioSpec {
    pub name: String,
    #[serde(default)]
    pub holdings: Vec<HoldingSpec>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PriceUpdate {
    pub stock: String,
    pub value: Decimal,
}

/// Stocks and portfolios to set up, followed by the price writes to replay.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Scenario {
    pub stocks: Vec<StockSpec>,
    #[serde(default)]
    pub portfolios: Vec<PortfolioSpec>,
    #[serde(default)]
    pub updates: Vec<PriceUpdate>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PortfolioSummary {
    pub name: String,
    pub total: Decimal,
}

#[derive(Debug)]
pub struct Market {
    pub stocks: Vec<Rc<Stock>>,
    pub portfolios: Vec<Rc<Portfolio>>,
}

impl Market {
    pub fn stock(&self, name: &str) -> Option<&Rc<Stock>> {
        self.stocks.iter().find(|stock| stock.name() == name)
    }

    pub fn portfolio(&self, name: &str) -> Option<&Rc<Portfolio>> {
        self.portfolios
            .iter()
            .find(|portfolio| portfolio.name() == name)
    }

    pub fn summaries(&self) -> Result<Vec<PortfolioSummary>, PortfolioError> {
        self.portfolios
            .iter()
            .map(|portfolio| {
                Ok(PortfolioSummary {
                    name: portfolio.name().to_string(),
                    total: portfolio.total()?,
                })
            })
            .collect()
    }
}

impl Default for Scenario {
    fn default() -> Self {
        let holding = |stock: &str, amount| HoldingSpec {
            stock: stock.to_string(),
            amount,
        };
        Self {
            stocks: vec![
                StockSpec {
                    name: String::from("Google"),
                    value: dec!(200),
                },
                StockSpec {
                    name: String::from("Vestas"),
                    value: dec!(45),
                },
            ],
            portfolios: vec![
                PortfolioSpec {
                    name: String::from("myPortfolio"),
                    holdings: vec![holding("Google", 50), holding("Vestas", 95)],
                },
                PortfolioSpec {
                    name: String::from("hisPortfolio"),
                    holdings: vec![holding("Google", 20)],
                },
            ],
            updates: vec![
                PriceUpdate {
                    stock: String::from("Google"),
                    value: dec!(55),
                },
                PriceUpdate {
                    stock: String::from("Vestas"),
                    value: dec!(20),
                },
            ],
        }
    }
}

impl Scenario {
    pub fn from_path(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path).map_err(ScenarioError::Read)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ScenarioError> {
        serde_json::from_str(content).map_err(ScenarioError::Parse)
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        let mut stocks = HashSet::new();
        for stock in self.stocks.iter() {
            if !stocks.insert(stock.name.as_str()) {
                return Err(ScenarioError::DuplicateStock(stock.name.clone()));
            }
        }

        let known = |name: &str, context: String| {
            if stocks.contains(name) {
                Ok(())
            } else {
                Err(ScenarioError::UnknownStock {
                    name: name.to_string(),
                    context,
                })
            }
        };

        let mut portfolios = HashSet::new();
        for portfolio in self.portfolios.iter() {
            if !portfolios.insert(portfolio.name.as_str()) {
                return Err(ScenarioError::DuplicatePortfolio(portfolio.name.clone()));
            }
            for holding in portfolio.holdings.iter() {
                known(&holding.stock, format!("portfolio '{}'", portfolio.name))?;
            }
        }
        for (i, update) in self.updates.iter().enumerate() {
            known(&update.stock, format!("update #{}", i + 1))?;
        }
        Ok(())
    }

    /// Builds the market, fills every portfolio, then applies the updates in
    /// order. Each update notifies synchronously through `display`.
    pub fn run(&self, display: Rc<dyn PortfolioDisplay>) -> Result<Market, ScenarioError> {
        self.validate()?;

        let stocks: Vec<Rc<Stock>> = self
            .stocks
            .iter()
            .map(|spec| Stock::new(&spec.name, spec.value))
            .collect();
        let mut market = Market {
            stocks,
            portfolios: Vec::with_capacity(self.portfolios.len()),
        };
        debug!("created {} stock(s)", market.stocks.len());

        for spec in self.portfolios.iter() {
            let portfolio = Portfolio::builder()
                .name(&spec.name)
                .display(display.clone())
                .build()?;
            for holding in spec.holdings.iter() {
                let stock = market
                    .stock(&holding.stock)
                    .ok_or_else(|| ScenarioError::UnknownStock {
                        name: holding.stock.clone(),
                        context: format!("portfolio '{}'", spec.name),
                    })?;
                portfolio.add_stock(stock, holding.amount)?;
            }
            market.portfolios.push(portfolio);
        }

        for (i, update) in self.updates.iter().enumerate() {
            let stock = market
                .stock(&update.stock)
                .ok_or_else(|| ScenarioError::UnknownStock {
                    name: update.stock.clone(),
                    context: format!("update #{}", i + 1),
                })?;
            info!("setting {} to {}", stock.name(), update.value);
            stock.set_value(update.value);
        }

        Ok(market)
    }
}
