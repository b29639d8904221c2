//! Catalog Records

use crate::uuids::TypedUuid;

/// Product Record
#[derive(Debug)]
pub struct ProductRecord;

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Variant Record
#[derive(Debug)]
pub struct VariantRecord;

/// Variant UUID
pub type VariantUuid = TypedUuid<VariantRecord>;
