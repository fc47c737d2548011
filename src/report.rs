use std::fmt::Write;

use crate::table::DistanceTable;

/// Renders one node's distance table for the final report, in the
/// routing-table layout: one row per destination, one column per
/// next-hop neighbor, self and unreachable cells left blank. Display
/// only; the convergence core never formats anything.
pub fn render_table(table: &DistanceTable) -> String {
    let n = table.num_nodes();
    let label = table.label();
    let inf = table.infinity();

    // Candidate next hops: any via row with a known entry.
    let vias: Vec<usize> = (0..n)
        .filter(|&via| via != label && (0..n).any(|d| table.cost_via(via, d) < inf))
        .collect();

    let mut out = String::new();
    writeln!(out, "node {label}                via").unwrap();
    write!(out, "  D{label} |").unwrap();
    for via in &vias {
        write!(out, " {via:>4}").unwrap();
    }
    writeln!(out).unwrap();
    writeln!(out, "  ----|{}", "-".repeat(5 * vias.len())).unwrap();

    for dest in (0..n).filter(|&d| d != label) {
        write!(out, "   {dest:>2} |").unwrap();
        for &via in &vias {
            let cost = table.cost_via(via, dest);
            if cost < inf {
                write!(out, " {cost:>4}").unwrap();
            } else {
                write!(out, "    -").unwrap();
            }
        }
        writeln!(out).unwrap();
    }

    writeln!(out, "  min |{}", summarize_row(table)).unwrap();
    out
}

fn summarize_row(table: &DistanceTable) -> String {
    let mut out = String::new();
    for dest in (0..table.num_nodes()).filter(|&d| d != table.label()) {
        let cost = table.cost_to(dest);
        if cost < table.infinity() {
            write!(out, " {dest}:{cost}").unwrap();
        } else {
            write!(out, " {dest}:unreachable").unwrap();
        }
    }
    out
}
