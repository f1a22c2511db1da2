//! Order domain types and the status state machine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rocket_core::ErrorCode;

/// Lifecycle status of an order.
///
/// ```text
/// PENDING_PAYMENT -> PAID       (payment succeeded)
/// PENDING_PAYMENT -> CANCELLED  (explicit cancel)
/// PAID            -> ASSEMBLED  (ShipAssembled event)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    PendingPayment,
    Paid,
    Cancelled,
    Assembled,
}

/// A requested status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Pay,
    Cancel,
    Assemble,
}

impl OrderStatus {
    pub const ALL: [Self; 4] = [
        Self::PendingPayment,
        Self::Paid,
        Self::Cancelled,
        Self::Assembled,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PendingPayment => "PENDING_PAYMENT",
            Self::Paid => "PAID",
            Self::Cancelled => "CANCELLED",
            Self::Assembled => "ASSEMBLED",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Assembled)
    }

    /// Resolve a transition from this status.
    ///
    /// `Ok(Some(next))` moves the order, `Ok(None)` means the order is
    /// already where the transition would put it and nothing changes.
    /// Only a repeated `Assemble` is a no-op; a repeated cancel is
    /// reported as `ORDER_CANCELLED`.
    pub const fn apply(self, transition: Transition) -> Result<Option<Self>, ErrorCode> {
        match (transition, self) {
            (Transition::Pay, Self::PendingPayment) => Ok(Some(Self::Paid)),
            (Transition::Cancel, Self::PendingPayment) => Ok(Some(Self::Cancelled)),
            (Transition::Pay | Transition::Cancel, Self::Paid | Self::Assembled) => {
                Err(ErrorCode::OrderAlreadyPaid)
            }
            (Transition::Pay | Transition::Cancel, Self::Cancelled) => {
                Err(ErrorCode::OrderCancelled)
            }
            (Transition::Assemble, Self::Paid) => Ok(Some(Self::Assembled)),
            (Transition::Assemble, Self::Assembled) => Ok(None),
            (Transition::Assemble, Self::PendingPayment | Self::Cancelled) => {
                Err(ErrorCode::OrderInvalidTransition)
            }
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|status| status.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown order status: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Card,
    Sbp,
    CreditCard,
    InvestorMoney,
}

impl PaymentMethod {
    pub const ALL: [Self; 4] = [Self::Card, Self::Sbp, Self::CreditCard, Self::InvestorMoney];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Card => "CARD",
            Self::Sbp => "SBP",
            Self::CreditCard => "CREDIT_CARD",
            Self::InvestorMoney => "INVESTOR_MONEY",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    /// Accepts the canonical names in any letter case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Self::ALL
            .iter()
            .find(|method| method.as_str() == wanted)
            .copied()
            .ok_or_else(|| format!("unknown payment method: {s}"))
    }
}

/// Input of `CreateOrder`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub user_uuid: Uuid,
    /// Requested parts in request order; ids may repeat.
    pub part_uuids: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub order_uuid: Uuid,
    pub user_uuid: Uuid,
    pub part_uuids: Vec<Uuid>,
    pub total_price: f64,
    pub transaction_uuid: Option<Uuid>,
    pub payment_method: Option<PaymentMethod>,
    pub status: OrderStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// A fresh order awaiting payment.
    pub fn new(draft: OrderDraft, total_price: f64, now: i64) -> Self {
        Self {
            order_uuid: Uuid::new_v4(),
            user_uuid: draft.user_uuid,
            part_uuids: draft.part_uuids,
            total_price,
            transaction_uuid: None,
            payment_method: None,
            status: OrderStatus::PendingPayment,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A guarded status change as written to storage.
///
/// Storage applies it only while the stored status still equals
/// [`StatusChange::from`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    Paid {
        transaction_uuid: Uuid,
        payment_method: PaymentMethod,
    },
    Cancelled,
    Assembled,
}

impl StatusChange {
    pub const fn from(&self) -> OrderStatus {
        match self {
            Self::Paid { .. } | Self::Cancelled => OrderStatus::PendingPayment,
            Self::Assembled => OrderStatus::Paid,
        }
    }

    pub const fn to(&self) -> OrderStatus {
        match self {
            Self::Paid { .. } => OrderStatus::Paid,
            Self::Cancelled => OrderStatus::Cancelled,
            Self::Assembled => OrderStatus::Assembled,
        }
    }
}
