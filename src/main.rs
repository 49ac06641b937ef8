use clap::Parser;
use pagerust::export::ConsoleSink;
use pagerust::{
    query, Envelope, Field, Interceptor, PageParams, PagerConfig, PagerError, PagingContext, QueryParams, Reply,
    SimpleExport, Table, TableQuery, TableSink, Value,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Pagerust demo: pages (or exports) an in-memory table through a marked handler
#[derive(Parser, Debug)]
#[command(name = "pagerust")]
#[command(about = "Runs a paged list handler over demo data", long_about = None)]
struct Args {
    /// Rows in the demo table
    #[arg(short = 'n', long, default_value_t = 1000)]
    rows: i64,

    /// Page to show (1-based)
    #[arg(short = 'p', long)]
    page: Option<i64>,

    /// Rows per page
    #[arg(short = 's', long)]
    size: Option<i64>,

    /// Export the full result to CSV instead of paging
    #[arg(short = 'e', long)]
    export: bool,

    /// Print the reply as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize)]
struct Entity {
    id: i64,
    name: String,
}

fn demo_table(rows: i64) -> Table<Entity> {
    let mut table = Table::new("entities".to_string());
    for id in 1..=rows {
        table.insert(Entity { id, name: format!("entity-{id}") });
    }
    table
}

/// The marked handler: auxiliary lookups run unpaged around the paged query
fn list(table: &Table<Entity>) -> Result<Reply<Entity>, PagerError> {
    let head = PagingContext::with_skip(|| query(&TableQuery::new(table).filter(|e| e.id <= 5)))?;
    tracing::debug!(rows = head.len(), "leading lookup");

    let data = query(&TableQuery::new(table))?;

    let tail = PagingContext::with_skip(|| query(&TableQuery::new(table).filter(|e| e.id > 15)))?;
    tracing::debug!(rows = tail.len(), "trailing lookup");

    Ok(Envelope::ok(Field::Rows(data)).into())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = PagerConfig::load();

    let mut params = QueryParams::default().with_names(config.param_names());
    if let Some(page) = args.page {
        params.insert(&config.page_param, page);
    }
    if let Some(size) = args.size {
        params.insert(&config.size_param, size);
    }
    if args.export {
        params.insert(&config.export_param, true);
    }

    let export = SimpleExport::new(&["idx", "id", "name"], |e: &Entity, idx| {
        vec![Value::from(idx), Value::from(e.id), Value::from(e.name.as_str())]
    });
    let options = config.options().with_export(export);
    let interceptor = Interceptor::new(options);

    let table = demo_table(args.rows);
    let reply = interceptor.call(&params, || list(&table))?;

    if params.export_requested() {
        if let Reply::Other(output) = &reply {
            println!("Exported to {output}");
        }
        return Ok(());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
        return Ok(());
    }

    let Some(page) = reply.page() else {
        println!("(no page)");
        return Ok(());
    };
    let mut console = ConsoleSink::new(std::io::stdout());
    console.write_header(&["id".to_string(), "name".to_string()])?;
    for entity in &page.rows {
        console.write_row(&[Value::from(entity.id), Value::from(entity.name.as_str())])?;
    }
    console.finish()?;
    println!(
        "page {}/{} ({} rows total, {} per page)",
        page.page_index, page.total_pages, page.total_count, page.page_size
    );

    Ok(())
}
