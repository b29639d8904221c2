//! Order Models

use rustc_hash::FxHashMap;

use crate::domain::orders::records::{OrderLineRecord, OrderRecord, OrderUuid};

/// An order with its line snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub record: OrderRecord,
    pub lines: Vec<OrderLineRecord>,
}

impl Order {
    /// Attach lines to their orders, keeping the order of `records`.
    pub(crate) fn assemble(records: Vec<OrderRecord>, lines: Vec<OrderLineRecord>) -> Vec<Self> {
        let mut grouped: FxHashMap<OrderUuid, Vec<OrderLineRecord>> = FxHashMap::default();

        for line in lines {
            grouped.entry(line.order_uuid).or_default().push(line);
        }

        records
            .into_iter()
            .map(|record| Self {
                lines: grouped.remove(&record.uuid).unwrap_or_default(),
                record,
            })
            .collect()
    }

    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }
}
