use std::path::Path;

use anyhow::{bail, Context};
use serde::Serialize;
use winmdgen::file::WinmdFile;

use crate::{
    app::GlobalOptions,
    output::{print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
struct TableEntry {
    table: String,
    rows: u32,
}

#[derive(Debug, Serialize)]
struct TablesOutput {
    version: String,
    mvid: String,
    timestamp: u32,
    tables: Vec<TableEntry>,
}

pub fn run(path: &Path, opts: &GlobalOptions) -> anyhow::Result<()> {
    let file = WinmdFile::from_file(path)
        .with_context(|| format!("failed to load metadata: {}", path.display()))?;

    let tables: Vec<TableEntry> = file
        .present_tables()
        .into_iter()
        .map(|table| TableEntry {
            table: format!("{table:?}"),
            rows: file.table_row_count(table),
        })
        .collect();
    if tables.is_empty() {
        bail!("no metadata tables found in {}", path.display());
    }

    let output = TablesOutput {
        version: file.version().to_string(),
        mvid: file
            .guid(1)
            .map(|guid| guid.to_string())
            .unwrap_or_else(|_| "?".to_string()),
        timestamp: file.timestamp(),
        tables,
    };

    print_output(&output, opts, |out| {
        println!("Metadata version: {}", out.version);
        println!("MVID:             {}", out.mvid);
        println!("Timestamp:        {:#010x}\n", out.timestamp);

        let mut tw = TabWriter::new(&[("Table", Align::Left), ("Rows", Align::Right)]);
        for entry in &out.tables {
            tw.row(vec![entry.table.clone(), entry.rows.to_string()]);
        }
        tw.print();
    })
}
