use crate::record::{LineItem, Order};
use indexmap::IndexMap;

/// Group line items into orders keyed by order number.
///
/// Orders come out in first-seen order and keep their items in encounter
/// order. Header fields are taken from each order's first item; the total is
/// the sum of every item's total amount.
pub fn group_orders<I>(items: I) -> Vec<Order>
where
    I: IntoIterator<Item = LineItem>,
{
    let mut by_number: IndexMap<String, Vec<LineItem>> = IndexMap::new();
    for item in items {
        by_number
            .entry(item.order_number.clone())
            .or_default()
            .push(item);
    }

    by_number
        .into_iter()
        .filter_map(|(order_number, items)| {
            let first = items.first()?;
            Some(Order {
                order_date: first.order_date.clone(),
                site_name: first.site_name.clone(),
                vendor_name: first.vendor_name.clone(),
                due_date: first.due_date.clone(),
                total_amount: items.iter().map(|i| i.total_amount).sum(),
                order_number,
                items,
            })
        })
        .collect()
}
