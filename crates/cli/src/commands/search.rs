//! Search command implementation.

use anyhow::Result;
use search_client::{ResultsKind, SearchJobClient, SearchQuery};
use tracing::info;

pub async fn run(client: &SearchJobClient, query: &SearchQuery, kind: ResultsKind) -> Result<()> {
    info!(%query, %kind, "Executing search");

    let output = match kind {
        ResultsKind::Events => serde_json::to_string_pretty(&client.events(query).await?)?,
        ResultsKind::Results => {
            let rows: Vec<serde_json::Value> = client.search(query, kind).await?;
            serde_json::to_string_pretty(&rows)?
        }
    };
    println!("{output}");
    Ok(())
}
