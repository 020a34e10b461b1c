//! Static command catalog.
//!
//! Declaration order is load-bearing: the matcher returns the **first** entry
//! whose trigger phrase occurs in the transcript, so an earlier entry shadows
//! any later one with an overlapping phrase. Do not reorder entries without
//! updating `tests::catalog_order_is_stable`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Voice-controllable POS operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    AddProduct,
    SearchProduct,
    RemoveProduct,
    ProcessPayment,
    PrintReceipt,
    NewCustomer,
    ApplyDiscount,
    CancelOrder,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::AddProduct => "addProduct",
            ActionKind::SearchProduct => "searchProduct",
            ActionKind::RemoveProduct => "removeProduct",
            ActionKind::ProcessPayment => "processPayment",
            ActionKind::PrintReceipt => "printReceipt",
            ActionKind::NewCustomer => "newCustomer",
            ActionKind::ApplyDiscount => "applyDiscount",
            ActionKind::CancelOrder => "cancelOrder",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grouping used by the help panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Product,
    Cart,
    Payment,
    /// Screen navigation. No built-in entry uses it yet.
    Navigation,
    Customer,
}

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    /// Canonical lowercase keyword matched as a substring.
    pub trigger_phrase: &'static str,
    pub action_kind: ActionKind,
    pub category: Category,
    pub description: &'static str,
    pub example: &'static str,
}

/// The built-in POS command catalog, in priority order.
pub const CATALOG: &[Intent] = &[
    Intent {
        trigger_phrase: "thêm sản phẩm",
        action_kind: ActionKind::AddProduct,
        category: Category::Product,
        description: "Thêm sản phẩm vào giỏ hàng",
        example: "Thêm sản phẩm iPhone 15",
    },
    Intent {
        trigger_phrase: "tìm kiếm",
        action_kind: ActionKind::SearchProduct,
        category: Category::Product,
        description: "Tìm kiếm sản phẩm",
        example: "Tìm kiếm laptop Dell",
    },
    Intent {
        trigger_phrase: "xóa sản phẩm",
        action_kind: ActionKind::RemoveProduct,
        category: Category::Cart,
        description: "Xóa sản phẩm khỏi giỏ hàng",
        example: "Xóa sản phẩm cuối cùng",
    },
    Intent {
        trigger_phrase: "thanh toán",
        action_kind: ActionKind::ProcessPayment,
        category: Category::Payment,
        description: "Thanh toán đơn hàng",
        example: "Thanh toán bằng thẻ",
    },
    Intent {
        trigger_phrase: "in hóa đơn",
        action_kind: ActionKind::PrintReceipt,
        category: Category::Payment,
        description: "In hóa đơn",
        example: "In hóa đơn",
    },
    Intent {
        trigger_phrase: "khách hàng mới",
        action_kind: ActionKind::NewCustomer,
        category: Category::Customer,
        description: "Tạo khách hàng mới",
        example: "Khách hàng mới",
    },
    Intent {
        trigger_phrase: "giảm giá",
        action_kind: ActionKind::ApplyDiscount,
        category: Category::Cart,
        description: "Áp dụng giảm giá",
        example: "Giảm giá 10 phần trăm",
    },
    Intent {
        trigger_phrase: "hủy đơn",
        action_kind: ActionKind::CancelOrder,
        category: Category::Cart,
        description: "Hủy đơn hàng",
        example: "Hủy đơn hàng",
    },
];

/// Look up the catalog entry for an action kind.
pub fn intent_for(kind: ActionKind) -> Option<&'static Intent> {
    CATALOG.iter().find(|intent| intent.action_kind == kind)
}

/// Entries belonging to `category`, in catalog order.
pub fn by_category(category: Category) -> impl Iterator<Item = &'static Intent> {
    CATALOG.iter().filter(move |intent| intent.category == category)
}
