use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;
use time::Date;
use tracing::info;

use crate::filter::{Facet, Filter, matches_query};
use crate::manager::{Change, Entity, EntityManager, FieldRule, RuleContext};
use crate::models::{Id, PersonRef};
use crate::utils::{parse_date, validate_date};

/// Order lifecycle: `Ordered -> Confirmed -> Issued`. An ordered gift may
/// also be issued directly, and `Cancelled` is reachable before issue.
/// `Issued` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    #[default]
    Ordered,
    Confirmed,
    Issued,
    Cancelled,
}

impl OrderStatus {
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Ordered, Confirmed)
                | (Ordered, Issued)
                | (Confirmed, Issued)
                | (Ordered, Cancelled)
                | (Confirmed, Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Issued | OrderStatus::Cancelled)
    }

    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::Ordered => "ordered",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Issued => "issued",
            OrderStatus::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("order {0} not found")]
    NotFound(Id),
    #[error("order {id} cannot move from {from} to {to}")]
    IllegalTransition {
        id: Id,
        from: OrderStatus,
        to: OrderStatus,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GiftRef {
    pub id: Id,
    pub name: String,
    pub photo_id: Option<Id>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Order {
    pub id: Id,
    pub gift: GiftRef,
    pub customer: PersonRef,
    /// `DD.MM.YYYY`
    pub order_date: String,
    pub status: OrderStatus,
}

impl Order {
    pub fn date(&self) -> Option<Date> {
        parse_date(&self.order_date)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderForm {
    pub gift: Option<GiftRef>,
    pub customer: Option<PersonRef>,
    pub order_date: String,
}

fn check_gift(form: &OrderForm, _ctx: &RuleContext<'_, Order>) -> Result<(), String> {
    match form.gift {
        Some(_) => Ok(()),
        None => Err("Select a gift".to_string()),
    }
}

fn check_customer(form: &OrderForm, _ctx: &RuleContext<'_, Order>) -> Result<(), String> {
    match form.customer {
        Some(_) => Ok(()),
        None => Err("Select a customer".to_string()),
    }
}

fn check_order_date(form: &OrderForm, _ctx: &RuleContext<'_, Order>) -> Result<(), String> {
    validate_date(&form.order_date, "Order date")
}

static ORDER_RULES: [FieldRule<Order>; 3] = [
    FieldRule { field: "gift", check: check_gift },
    FieldRule { field: "customer", check: check_customer },
    FieldRule { field: "order_date", check: check_order_date },
];

impl Entity for Order {
    const KIND: &'static str = "order";
    type Form = OrderForm;
    type Filter = OrderFilter;

    fn id(&self) -> Id {
        self.id
    }

    fn rules() -> &'static [FieldRule<Self>] {
        &ORDER_RULES
    }

    fn to_form(&self) -> OrderForm {
        OrderForm {
            gift: Some(self.gift.clone()),
            customer: Some(self.customer.clone()),
            order_date: self.order_date.clone(),
        }
    }

    fn create(id: Id, form: OrderForm) -> Self {
        let mut order = Order {
            id,
            ..Order::default()
        };
        order.apply(form);
        order
    }

    /// Status is owned by the workflow and never changes through the form.
    fn apply(&mut self, form: OrderForm) {
        if let Some(gift) = form.gift {
            self.gift = gift;
        }
        if let Some(customer) = form.customer {
            self.customer = customer;
        }
        self.order_date = form.order_date;
    }
}

impl EntityManager<Order> {
    pub fn transition(&mut self, id: Id, to: OrderStatus) -> Result<Change, OrderError> {
        let from = self.get(id).ok_or(OrderError::NotFound(id))?.status;
        if !from.can_transition_to(to) {
            return Err(OrderError::IllegalTransition { id, from, to });
        }
        let change = self
            .modify(id, |order| order.status = to)
            .map_err(|_| OrderError::NotFound(id))?;
        info!(order_id = id, %from, %to, "order status changed");
        Ok(change)
    }

    pub fn confirm(&mut self, id: Id) -> Result<Change, OrderError> {
        self.transition(id, OrderStatus::Confirmed)
    }

    pub fn issue(&mut self, id: Id) -> Result<Change, OrderError> {
        self.transition(id, OrderStatus::Issued)
    }

    pub fn cancel_order(&mut self, id: Id) -> Result<Change, OrderError> {
        self.transition(id, OrderStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderTab {
    /// Ordered or confirmed.
    #[default]
    Active,
    /// Issued or cancelled.
    Completed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub tab: OrderTab,
    pub query: String,
    /// Restricts to the selected customers when set.
    pub customers: Option<Facet<Id>>,
}

impl Filter<Order> for OrderFilter {
    fn matches(&self, order: &Order) -> bool {
        let in_tab = match self.tab {
            OrderTab::Active => order.status.is_active(),
            OrderTab::Completed => order.status.is_terminal(),
        };
        in_tab
            && matches_query(
                &self.query,
                &[order.gift.name.as_str(), order.customer.full_name.as_str()],
            )
            && self
                .customers
                .as_ref()
                .is_none_or(|facet| facet.contains(&order.customer.id))
    }

    /// Newest first; unparseable dates sort last.
    fn compare(&self, a: &Order, b: &Order) -> Ordering {
        match (a.date(), b.date()) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}
