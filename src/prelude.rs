pub use std::{collections::BTreeMap, time::Duration};

pub use anyhow::Context;
pub use chrono::{NaiveDateTime as DateTime, Utc};
pub use migration::{Migrator, MigratorTrait};
pub use sea_orm::{
  ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait,
  NotSet, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
pub use tracing::{debug, error, info};

pub use crate::error::{Error, FieldError, Result};
