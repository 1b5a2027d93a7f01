use std::{collections::HashMap, sync::Arc};

use log::*;
use tokio::sync::Mutex;

use crate::{
    db_types::{Order, OrderId, PaymentReference},
    traits::{LedgerError, OrderLedger},
};

#[derive(Debug, Default)]
struct LedgerState {
    orders: Vec<Order>,
    by_id: HashMap<OrderId, usize>,
    by_reference: HashMap<PaymentReference, usize>,
}

impl LedgerState {
    fn check_unique(&self, order: &Order) -> Result<(), LedgerError> {
        if self.by_id.contains_key(&order.id) {
            return Err(LedgerError::DuplicateOrderId(order.id.clone()));
        }
        match &order.reference {
            Some(r) if self.by_reference.contains_key(r) => Err(LedgerError::DuplicateReference(r.clone())),
            _ => Ok(()),
        }
    }

    fn push(&mut self, order: Order) -> Order {
        let index = self.orders.len();
        self.by_id.insert(order.id.clone(), index);
        if let Some(reference) = &order.reference {
            self.by_reference.insert(reference.clone(), index);
        }
        self.orders.push(order.clone());
        order
    }

    fn get_by_reference(&self, reference: &PaymentReference) -> Option<&Order> {
        self.by_reference.get(reference).and_then(|&i| self.orders.get(i))
    }
}

/// An in-memory [`OrderLedger`].
///
/// Clones share the same underlying ledger. A single mutex covers the order list and both indexes, so every
/// check-then-append runs as one critical section.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderLedger for MemoryLedger {
    async fn append(&self, order: Order) -> Result<Order, LedgerError> {
        let mut state = self.state.lock().await;
        state.check_unique(&order)?;
        let order = state.push(order);
        debug!("📒️ Order {} appended. {} orders in ledger", order.id, state.orders.len());
        Ok(order)
    }

    async fn insert_if_absent(&self, order: Order) -> Result<(Order, bool), LedgerError> {
        let mut state = self.state.lock().await;
        if let Some(existing) = order.reference.as_ref().and_then(|r| state.get_by_reference(r)) {
            trace!("📒️ Order {} already exists for reference {:?}", existing.id, existing.reference);
            return Ok((existing.clone(), false));
        }
        state.check_unique(&order)?;
        let order = state.push(order);
        debug!("📒️ Order {} inserted. {} orders in ledger", order.id, state.orders.len());
        Ok((order, true))
    }

    async fn list(&self) -> Result<Vec<Order>, LedgerError> {
        Ok(self.state.lock().await.orders.clone())
    }

    async fn find_by_reference(&self, reference: &PaymentReference) -> Result<Option<Order>, LedgerError> {
        Ok(self.state.lock().await.get_by_reference(reference).cloned())
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, LedgerError> {
        let state = self.state.lock().await;
        Ok(state.by_id.get(id).and_then(|&i| state.orders.get(i)).cloned())
    }

    async fn count(&self) -> Result<usize, LedgerError> {
        Ok(self.state.lock().await.orders.len())
    }
}
