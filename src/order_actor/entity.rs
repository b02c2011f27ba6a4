use super::error::OrderError;
use crate::actor_framework::Entity;
use crate::domain::{Order, OrderCreate, OrderStatus, PatchOrder, Record};
use crate::store::Identified;

impl Identified for Order {
    fn id(&self) -> &str {
        &self.record.id
    }
}

impl Entity for Order {
    const KIND: &'static str = "order";

    type CreatePayload = OrderCreate;
    type Patch = PatchOrder;
    type Action = (); // No custom actions
    type ActionResult = ();
    type Error = OrderError;

    /// Creates a new Order from priced items.
    ///
    /// # Notes
    /// The order starts PENDING without a tracking number. `total_amount` is
    /// always the sum of the item subtotals; nothing supplied by a client is
    /// trusted for it.
    fn from_create(id: String, params: OrderCreate) -> Result<Self, OrderError> {
        if params.items.is_empty() {
            return Err(OrderError::InvalidOrder("order must contain at least one item".into()));
        }
        let record = Record::new(id);
        Ok(Self {
            placed_at: record.created_at,
            record,
            customer_id: params.customer_id,
            total_amount: Order::total_of(&params.items),
            items: params.items,
            status: OrderStatus::Pending,
            payment_method: params.payment_method,
            shipping_address: params.shipping_address,
            tracking_number: None,
            note: params.note,
        })
    }

    /// Re-runs the state machine inside the actor, then merges the patch.
    fn on_update(&mut self, patch: PatchOrder) -> Result<(), OrderError> {
        self.validate_patch(&patch)?;
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(tracking_number) = patch.tracking_number {
            self.tracking_number = Some(tracking_number);
        }
        if let Some(note) = patch.note {
            self.note = Some(note);
        }
        self.record.touch();
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), OrderError> {
        Ok(())
    }
}

impl Order {
    /// Checks a patch against the current status and returns the status the
    /// order would move to, if any.
    ///
    /// # Errors
    /// - `InvalidState` when the order is COMPLETED or CANCELLED, whatever
    ///   the patch contains
    /// - `InvalidTransition` when the requested status is not reachable
    ///   from the current one (asking for the current status included)
    /// - `InvalidPatch` when a tracking number is supplied for an order that
    ///   is not, and is not becoming, SHIPPED
    pub fn validate_patch(&self, patch: &PatchOrder) -> Result<Option<OrderStatus>, OrderError> {
        if self.status.is_terminal() {
            return Err(OrderError::InvalidState(self.status));
        }
        if let Some(next) = patch.status {
            if !self.status.can_transition_to(next) {
                return Err(OrderError::InvalidTransition {
                    from: self.status,
                    to: next,
                });
            }
        }
        let resulting = patch.status.unwrap_or(self.status);
        if patch.tracking_number.is_some() && resulting != OrderStatus::Shipped {
            return Err(OrderError::InvalidPatch(format!(
                "tracking number can only be set on a shipped order, not {resulting}"
            )));
        }
        Ok(patch.status)
    }
}
