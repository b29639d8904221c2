//! Delivery Models

use storefront::delivery::Pincode;

use crate::domain::delivery::records::DeliveryLocation;

/// Result of a delivery availability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryCheck {
    pub pincode: Pincode,

    /// The serviceable location, when delivery is available.
    pub location: Option<DeliveryLocation>,

    pub free_delivery_text: Option<String>,
}

impl DeliveryCheck {
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.location.is_some()
    }

    /// Customer-facing summary of the check.
    #[must_use]
    pub fn message(&self) -> String {
        match &self.location {
            Some(location) => format!(
                "Delivery available to {}, {}",
                location.area_name, location.city
            ),
            None => format!("Delivery not available for pincode {}", self.pincode),
        }
    }
}
