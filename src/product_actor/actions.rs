/// Custom actions for Product entities.
///
/// Each one is handled inside the product actor as a single message, so the
/// check and the mutation of a stock action can never interleave with
/// another order's.
#[derive(Debug, Clone)]
pub enum ProductAction {
    /// Checks that the product is sellable and holds at least this many
    /// units, without modifying it.
    CheckAvailability(u32),
    /// Removes units from stock after re-running the availability check.
    ///
    /// # Errors
    /// Fails if the product is not ACTIVE or holds fewer units.
    Deduct(u32),
    /// Returns units to stock, e.g. from a cancelled order.
    Restore(u32),
    /// Takes back units handed out by an earlier `Restore` whose order
    /// change was never written. Skips the sellability check, so it works
    /// on a DISCONTINUED product too.
    ///
    /// # Errors
    /// Fails if the product holds fewer units.
    Withdraw(u32),
}

/// Results from ProductActions - variants match 1:1 with ProductAction.
/// Each carries the stock level after the action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductActionResult {
    CheckAvailability(u32),
    Deduct(u32),
    Restore(u32),
    Withdraw(u32),
}
