//! Ledger tables and their column layouts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::codec::Schema;

/// Sales: `VENTA-<millis>` keyed, amounts derived from quantity and price.
pub const SALE_SCHEMA: Schema = Schema {
    fields: &[
        "date",
        "id",
        "client",
        "quantity",
        "unit_price",
        "description",
        "gross_amount",
        "amount_paid",
        "balance_due",
        "tax",
    ],
    key_field: "id",
    immutable: &["id"],
    date_field: Some("date"),
};

/// Expenses: `GTO-<millis>` keyed.
pub const EXPENSE_SCHEMA: Schema = Schema {
    fields: &[
        "date",
        "id",
        "tax_id",
        "company_name",
        "concept",
        "quantity",
        "description",
        "unit_price",
        "total_amount",
        "tax",
        "created_at",
    ],
    key_field: "id",
    immutable: &["id", "created_at"],
    date_field: Some("date"),
};

/// Clients: `CLIENTE-<millis>` keyed.
pub const CLIENT_SCHEMA: Schema = Schema {
    fields: &["id", "name", "phone", "email", "created_at"],
    key_field: "id",
    immutable: &["id", "created_at"],
    date_field: Some("created_at"),
};

/// Inventory: keyed by the caller-supplied `code`.
pub const INVENTORY_SCHEMA: Schema = Schema {
    fields: &[
        "code",
        "name",
        "type",
        "current_stock",
        "unit_of_measure",
        "minimum_stock",
        "last_modified_by",
    ],
    key_field: "code",
    immutable: &["code"],
    date_field: None,
};

/// A ledger table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    /// Sales.
    Sales,
    /// Expenses.
    Expenses,
    /// Clients.
    Clients,
    /// Inventory items.
    Inventory,
}

impl Table {
    /// All tables, in sheet order.
    pub const ALL: [Self; 4] = [Self::Sales, Self::Expenses, Self::Clients, Self::Inventory];

    /// Column layout.
    #[must_use]
    pub fn schema(self) -> &'static Schema {
        match self {
            Self::Sales => &SALE_SCHEMA,
            Self::Expenses => &EXPENSE_SCHEMA,
            Self::Clients => &CLIENT_SCHEMA,
            Self::Inventory => &INVENTORY_SCHEMA,
        }
    }

    /// Prefix of server-generated IDs; `None` for natural keys.
    #[must_use]
    pub const fn id_prefix(self) -> Option<&'static str> {
        match self {
            Self::Sales => Some("VENTA"),
            Self::Expenses => Some("GTO"),
            Self::Clients => Some("CLIENTE"),
            Self::Inventory => None,
        }
    }

    /// Path segment naming this table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::Expenses => "expenses",
            Self::Clients => "clients",
            Self::Inventory => "inventory",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Table {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sales" | "ventas" => Ok(Self::Sales),
            "expenses" | "gastos" => Ok(Self::Expenses),
            "clients" | "clientes" => Ok(Self::Clients),
            "inventory" | "inventario" => Ok(Self::Inventory),
            _ => Err(format!("Unknown table: {s}")),
        }
    }
}
