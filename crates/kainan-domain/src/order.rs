//! Order lifecycle types.

use serde::{Deserialize, Serialize};

/// Order fulfillment status.
///
/// Wire format: the display strings below (e.g. `"Out for Delivery"`),
/// matching what the mobile clients already render verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Processing,
    Preparing,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Parse from the wire string. Returns `None` for unknown values.
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "Processing" => Some(Self::Processing),
            "Preparing" => Some(Self::Preparing),
            "Out for Delivery" => Some(Self::OutForDelivery),
            "Delivered" => Some(Self::Delivered),
            "Cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Wire string for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "Processing",
            Self::Preparing => "Preparing",
            Self::OutForDelivery => "Out for Delivery",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    /// `Delivered` and `Cancelled` are absorbing: no transition leaves them.
    pub fn is_terminal(self) -> bool {
        match self {
            Self::Delivered | Self::Cancelled => true,
            Self::Processing | Self::Preparing | Self::OutForDelivery => false,
        }
    }

    /// Whether a rider may be assigned while the order is in this status.
    pub fn accepts_rider(self) -> bool {
        matches!(self, Self::OutForDelivery | Self::Delivered)
    }

    /// Whether the owning user may still cancel.
    pub fn cancellable(self) -> bool {
        matches!(self, Self::Processing)
    }
}
