use serde::Serialize;
use stocksim_warehouse::CollectionInfo;

use crate::error::CliError;
use crate::output::Table;

use super::{CommandResult, Session};

#[derive(Debug, Serialize)]
struct StoreResponseData {
    database: Option<String>,
    collections: Vec<StoredCollection>,
}

#[derive(Debug, Serialize)]
struct StoredCollection {
    #[serde(flatten)]
    info: CollectionInfo,
    writes: u64,
}

pub fn list(session: &Session) -> Result<CommandResult, CliError> {
    let warehouse = &session.warehouse;
    let mut collections = Vec::new();
    for info in warehouse.list()? {
        let writes = warehouse.write_count(&info.name)?;
        collections.push(StoredCollection { info, writes });
    }

    let mut table = Table::new(vec!["collection", "bytes", "writes", "updated_at"]);
    for collection in &collections {
        table.push(vec![
            collection.info.name.clone(),
            collection.info.bytes.to_string(),
            collection.writes.to_string(),
            collection.info.updated_at.clone(),
        ]);
    }

    let data = StoreResponseData {
        database: warehouse.db_path().map(|path| path.display().to_string()),
        collections,
    };
    Ok(CommandResult::ok(serde_json::to_value(&data)?).with_table(table))
}
