/// Controls when cancelling an order returns its units to stock.
///
/// Administrative cancellation always restocks. Customer cancellation only
/// restocks when `restock_on_customer_cancel` is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestockPolicy {
    pub restock_on_customer_cancel: bool,
}

impl RestockPolicy {
    pub fn new(restock_on_customer_cancel: bool) -> Self {
        Self {
            restock_on_customer_cancel,
        }
    }
}
