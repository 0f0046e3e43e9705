use std::io::Write;

use super::{Group, TraceError};

/// Write a group of draws as a wide CSV table, one row per (chain, draw).
/// Variables without draws are skipped.
pub(crate) fn write_group<W: Write>(group: &Group, writer: W) -> Result<(), TraceError> {
    let vars: Vec<_> = group.variables().iter().filter(|v| v.has_draws()).collect();

    let mut header = vec![String::from("chain"), String::from("draw")];
    for var in &vars {
        header.extend(var.element_labels(group.coords()));
    }

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&header)?;

    let columns: Vec<Vec<Vec<f64>>> = vars
        .iter()
        .flat_map(|var| (0..var.n_elements()).map(|e| var.element_chains(e)))
        .collect();

    let mut row = Vec::with_capacity(header.len());
    for chain in 0..group.n_chains() {
        for draw in 0..group.n_draws() {
            row.clear();
            row.push(chain.to_string());
            row.push(draw.to_string());
            row.extend(columns.iter().map(|col| col[chain][draw].to_string()));
            wtr.write_record(&row)?;
        }
    }
    wtr.flush()?;
    Ok(())
}
