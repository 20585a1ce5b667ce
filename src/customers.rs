//! Customers

use slotmap::new_key_type;

new_key_type! {
    /// Customer Key
    pub struct CustomerKey;
}
