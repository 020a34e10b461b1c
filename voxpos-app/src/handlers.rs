//! Host action handlers.
//!
//! The console host has no cart or payment terminal; each handler logs the
//! operation it would perform with the extracted parameters.

use tracing::info;
use voxpos_core::{ActionKind, CommandResult, VoxEngine};

const HOST_ACTIONS: [ActionKind; 8] = [
    ActionKind::AddProduct,
    ActionKind::SearchProduct,
    ActionKind::RemoveProduct,
    ActionKind::ProcessPayment,
    ActionKind::PrintReceipt,
    ActionKind::NewCustomer,
    ActionKind::ApplyDiscount,
    ActionKind::CancelOrder,
];

pub fn register_all(engine: &mut VoxEngine) {
    for kind in HOST_ACTIONS {
        engine.register_handler(kind, move |cmd: &CommandResult| -> anyhow::Result<()> {
            log_operation(kind, cmd);
            Ok(())
        });
    }
}

fn log_operation(kind: ActionKind, cmd: &CommandResult) {
    let params = &cmd.parameters;
    match kind {
        ActionKind::AddProduct => info!(product = params.product_name(), "cart: add product"),
        ActionKind::SearchProduct => info!(term = params.search_term(), "catalog: search"),
        ActionKind::ApplyDiscount => {
            info!(percent = params.discount_percent(), "cart: apply discount")
        }
        ActionKind::ProcessPayment => info!(
            method = params.payment_method().map(|m| m.keyword()),
            "payment: capture"
        ),
        ActionKind::RemoveProduct => info!("cart: remove last product"),
        ActionKind::PrintReceipt => info!("printer: print receipt"),
        ActionKind::NewCustomer => info!("customers: open new customer form"),
        ActionKind::CancelOrder => info!("cart: cancel order"),
    }
}
