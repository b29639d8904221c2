//! Address Data

/// New Address Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAddress {
    pub title: String,
    pub full_address: String,
    pub landmark: Option<String>,
    pub pincode: String,
    pub phone: String,

    /// Make this the default address. The first address always becomes the default.
    pub is_default: bool,
}
