//! Bundled practice datasets
//!
//! Each dataset is a single table created and seeded by an SQL script under
//! `data/datasets/`. Descriptive metadata (advertised size, example queries)
//! comes from `data/datasets.json`.

use super::Level;
use crate::error::{PracticeError, Result};
use serde::{Deserialize, Serialize};

/// A ready-made query shown next to the editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryExample {
    pub title: String,
    pub level: Level,
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    /// Dataset name, also the name of the table it creates
    pub name: String,

    /// Size advertised in the schema listing
    pub rows: u32,

    #[serde(default)]
    pub examples: Vec<QueryExample>,

    /// CREATE TABLE + INSERT script
    #[serde(skip)]
    pub script: &'static str,
}

impl Dataset {
    pub fn table_name(&self) -> &str {
        &self.name
    }
}

const MANIFEST: &str = include_str!("../../data/datasets.json");

fn script_for(name: &str) -> Option<&'static str> {
    let script = match name {
        "employees" => include_str!("../../data/datasets/employees.sql"),
        "customers" => include_str!("../../data/datasets/customers.sql"),
        "products" => include_str!("../../data/datasets/products.sql"),
        "orders" => include_str!("../../data/datasets/orders.sql"),
        "sales" => include_str!("../../data/datasets/sales.sql"),
        "departments" => include_str!("../../data/datasets/departments.sql"),
        "transactions" => include_str!("../../data/datasets/transactions.sql"),
        _ => return None,
    };
    Some(script)
}

pub(crate) fn load_bundled() -> Result<Vec<Dataset>> {
    let mut datasets: Vec<Dataset> = serde_json::from_str(MANIFEST)?;
    for dataset in &mut datasets {
        dataset.script = script_for(&dataset.name).ok_or_else(|| {
            PracticeError::Dataset(format!("No SQL script bundled for '{}'", dataset.name))
        })?;
    }
    Ok(datasets)
}
