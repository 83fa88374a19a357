use std::{
    cell::RefCell,
    fmt::{Debug, Display},
    rc::{Rc, Weak},
};

use colored::Colorize;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, info, warn};

use crate::{
    display::{format_total, PortfolioDisplay},
    error::PortfolioError,
    observer::{Observer, ObserverId, Subject},
    stock::Stock,
};

#[derive(Clone, Debug)]
pub struct Holding {
    pub stock: Rc<Stock>,
    pub quantity: u64,
}

impl Holding {
    /// `None` when price times quantity does not fit in a `Decimal`.
    pub fn total(&self) -> Option<Decimal> {
        self.stock.value().checked_mul(Decimal::from(self.quantity))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Addition {
    Added,
    Increased { quantity: u64 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Removal {
    NotHeld,
    Removed,
    Decreased { quantity: u64 },
}

/// Stocks held with a quantity each. A portfolio observes every stock it
/// holds and refreshes its display whenever one of their prices is written.
pub struct Portfolio {
    id: ObserverId,
    name: String,
    me: Weak<Portfolio>,
    display: Rc<dyn PortfolioDisplay>,
    holdings: RefCell<Vec<Holding>>,
}

#[derive(Default)]
pub struct PortfolioBuilder {
    name: Option<String>,
    display: Option<Rc<dyn PortfolioDisplay>>,
}

impl PortfolioBuilder {
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn display(mut self, display: Rc<dyn PortfolioDisplay>) -> Self {
        self.display = Some(display);
        self
    }

    pub fn build(self) -> Result<Rc<Portfolio>, PortfolioError> {
        let display = self.display.ok_or(PortfolioError::NullCollaborator)?;
        let name = self.name.unwrap_or_else(|| String::from("portfolio"));
        Ok(Portfolio::new(&name, display))
    }
}

fn quantity(amount: i64) -> Result<u64, PortfolioError> {
    match u64::try_from(amount) {
        Ok(quantity) if quantity > 0 => Ok(quantity),
        _ => Err(PortfolioError::InvalidArgument { amount }),
    }
}

impl Portfolio {
    pub fn new(name: &str, display: Rc<dyn PortfolioDisplay>) -> Rc<Self> {
        Rc::new_cyclic(|me| Self {
            id: ObserverId::next(),
            name: name.to_string(),
            me: me.clone(),
            display,
            holdings: RefCell::new(vec![]),
        })
    }

    pub fn builder() -> PortfolioBuilder {
        PortfolioBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn observer(&self) -> Weak<dyn Observer> {
        let me: Weak<dyn Observer> = self.me.clone();
        me
    }

    fn position(&self, stock: &Rc<Stock>) -> Option<usize> {
        self.holdings
            .borrow()
            .iter()
            .position(|holding| Rc::ptr_eq(&holding.stock, stock))
    }

    /// Fails without touching the holding when `amount` is not positive or
    /// the resulting quantity does not fit in a `u64`.
    pub fn add_stock(&self, stock: &Rc<Stock>, amount: i64) -> Result<Addition, PortfolioError> {
        let added = quantity(amount)?;

        match self.position(stock) {
            Some(i) => {
                let mut holdings = self.holdings.borrow_mut();
                let holding = &mut holdings[i];
                let Some(total) = holding.quantity.checked_add(added) else {
                    warn!(
                        "{} more {} would overflow {}",
                        amount,
                        stock.name(),
                        self.name
                    );
                    return Err(PortfolioError::InvalidArgument { amount });
                };
                holding.quantity = total;
                info!("{} has been added to {}", amount, stock.name());
                Ok(Addition::Increased { quantity: total })
            }
            None => {
                self.holdings.borrow_mut().push(Holding {
                    stock: stock.clone(),
                    quantity: added,
                });
                stock.register(self.observer());
                info!("{} has added to {}", stock.name(), self.name);
                Ok(Addition::Added)
            }
        }
    }

    pub fn remove_stock(
        &self,
        stock: &Rc<Stock>,
        amount: i64,
    ) -> Result<Removal, PortfolioError> {
        let amount = quantity(amount)?;

        let Some(i) = self.position(stock) else {
            info!("{} is not a part of {}", stock.name(), self.name);
            return Ok(Removal::NotHeld);
        };

        let mut holdings = self.holdings.borrow_mut();
        if amount >= holdings[i].quantity {
            holdings.remove(i);
            drop(holdings);
            stock.unregister(self.id);
            info!("{} has been removed from {}", stock.name(), self.name);
            Ok(Removal::Removed)
        } else {
            holdings[i].quantity -= amount;
            info!("{} has been removed from {}", amount, stock.name());
            Ok(Removal::Decreased {
                quantity: holdings[i].quantity,
            })
        }
    }

    /// Sum of price times quantity over the holdings, at current prices.
    pub fn total(&self) -> Result<Decimal, PortfolioError> {
        let overflow = || PortfolioError::TotalOverflow {
            portfolio: self.name.clone(),
        };
        self.holdings
            .borrow()
            .iter()
            .try_fold(dec!(0), |acc, holding| {
                holding
                    .total()
                    .and_then(|line| acc.checked_add(line))
                    .ok_or_else(overflow)
            })
    }

    pub fn quantity_of(&self, stock: &Rc<Stock>) -> Option<u64> {
        self.holdings
            .borrow()
            .iter()
            .find(|holding| Rc::ptr_eq(&holding.stock, stock))
            .map(|holding| holding.quantity)
    }

    /// Snapshot of the holdings in insertion order.
    pub fn holdings(&self) -> Vec<Holding> {
        self.holdings.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.borrow().is_empty()
    }
}

impl Observer for Portfolio {
    fn id(&self) -> ObserverId {
        self.id
    }

    fn value_changed(&self, stock: &Stock) {
        debug!(
            "{} notified: {} changed to {}",
            self.name,
            stock.name(),
            stock.value()
        );
        self.display.value_changed(stock);
        self.display.print_information(self);
    }
}

impl Display for Portfolio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s: Vec<String> = self
            .holdings
            .borrow()
            .iter()
            .map(|holding| {
                format!(
                    "{}: {} (~{})",
                    holding.stock.name(),
                    holding.quantity.to_string().purple(),
                    format_total(holding.total())
                )
            })
            .collect();
        write!(
            f,
            "~{} : {}",
            format_total(self.total().ok()).yellow(),
            s.join(" / ")
        )
    }
}

impl Debug for Portfolio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Portfolio")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("holdings", &self.holdings.borrow())
            .finish()
    }
}
