//! Order, payment and fulfillment status machines.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A status string that does not name a known state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownStatus {
    kind: &'static str,
    value: String,
}

impl UnknownStatus {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Order lifecycle.
///
/// `Cart -> Placed -> Confirmed -> Preparing -> OutForDelivery -> Delivered`, with
/// `Cancelled` reachable from `Placed` or `Confirmed` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Shell created, lines still being materialized.
    Cart,
    /// Checkout committed.
    Placed,
    /// Accepted by the store.
    Confirmed,
    /// Being packed.
    Preparing,
    /// With the courier.
    OutForDelivery,
    /// Handed over to the customer.
    Delivered,
    /// Abandoned before preparation.
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 7] = [
        Self::Cart,
        Self::Placed,
        Self::Confirmed,
        Self::Preparing,
        Self::OutForDelivery,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cart => "cart",
            Self::Placed => "placed",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Label shown to customers.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Cart => "In Cart",
            Self::Placed => "Order Placed",
            Self::Confirmed => "Confirmed",
            Self::Preparing => "Preparing",
            Self::OutForDelivery => "Out for Delivery",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    const fn rank(self) -> Option<u8> {
        match self {
            Self::Cart => Some(0),
            Self::Placed => Some(1),
            Self::Confirmed => Some(2),
            Self::Preparing => Some(3),
            Self::OutForDelivery => Some(4),
            Self::Delivered => Some(5),
            Self::Cancelled => None,
        }
    }

    /// Whether no further transition is possible.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether the order has left the cart stage.
    pub const fn is_placed(self) -> bool {
        !matches!(self, Self::Cart)
    }

    /// Whether the order may still be cancelled.
    pub const fn can_be_cancelled(self) -> bool {
        matches!(self, Self::Placed | Self::Confirmed)
    }

    /// Whether moving to `next` keeps the lifecycle strictly forward.
    pub fn can_transition_to(self, next: Self) -> bool {
        if next == Self::Cancelled {
            return self.can_be_cancelled();
        }

        match (self.rank(), next.rank()) {
            (Some(current), Some(next)) => next > current,
            _ => false,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| UnknownStatus::new("order status", value))
    }
}

/// Payment state, for both individual payments and the order aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Awaiting settlement.
    Pending,
    /// Settled.
    Paid,
    /// Declined or abandoned.
    Failed,
    /// Returned to the customer.
    Refunded,
}

impl PaymentStatus {
    /// Every status.
    pub const ALL: [Self; 4] = [Self::Pending, Self::Paid, Self::Failed, Self::Refunded];

    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }

    /// Whether a single payment record may move to `next`.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Paid | Self::Failed) | (Self::Paid, Self::Refunded)
        )
    }

    /// The order-level payment status after one of its payments settles as `outcome`.
    ///
    /// A failed retry never downgrades a paid order, and nothing leaves `Refunded`.
    pub const fn settle(self, outcome: Self) -> Self {
        match (self, outcome) {
            (Self::Pending | Self::Failed, Self::Paid) => Self::Paid,
            (Self::Pending | Self::Failed, Self::Failed) => Self::Failed,
            (Self::Paid, Self::Refunded) => Self::Refunded,
            (current, _) => current,
        }
    }

    /// Whether the order can no longer accept payments.
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Paid | Self::Refunded)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| UnknownStatus::new("payment status", value))
    }
}

/// How a payment is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on delivery.
    Cod,
    /// Online payment.
    Online,
    /// UPI.
    Upi,
    /// Credit or debit card.
    Card,
    /// Wallet.
    Wallet,
}

impl PaymentMethod {
    /// Every method.
    pub const ALL: [Self; 5] = [Self::Cod, Self::Online, Self::Upi, Self::Card, Self::Wallet];

    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cod => "cod",
            Self::Online => "online",
            Self::Upi => "upi",
            Self::Card => "card",
            Self::Wallet => "wallet",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == value)
            .ok_or_else(|| UnknownStatus::new("payment method", value))
    }
}
