use crate::core::methods::derivative_length;
use crate::core::models::system::MolecularSystem;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DerivativeExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Derivative of order {order} for {atoms} atoms needs {expected} values, got {found}")]
    Length {
        order: usize,
        atoms: usize,
        expected: usize,
        found: usize,
    },
    #[error("A derivative of order {order} for {atoms} atoms is too large to address")]
    TooLarge { order: usize, atoms: usize },
}

/// Writes a whole-system derivative as CSV.
///
/// - order 0: a single `energy` row;
/// - order 1: one row per atom (`atom,element,x,y,z`);
/// - higher orders: one row per tensor element (`index,value`), row-major.
pub fn write_csv<W: Write>(
    writer: W,
    system: &MolecularSystem,
    derivative: &[f64],
    order: usize,
) -> Result<(), DerivativeExportError> {
    let expected =
        derivative_length(system.len(), order).ok_or(DerivativeExportError::TooLarge {
            order,
            atoms: system.len(),
        })?;
    if derivative.len() != expected {
        return Err(DerivativeExportError::Length {
            order,
            atoms: system.len(),
            expected,
            found: derivative.len(),
        });
    }

    let mut csv = csv::Writer::from_writer(writer);
    match order {
        0 => {
            csv.write_record(["quantity", "value"])?;
            csv.write_record(["energy".to_string(), format!("{:.12}", derivative[0])])?;
        }
        1 => {
            csv.write_record(["atom", "element", "x", "y", "z"])?;
            for (i, (atom, row)) in system
                .atoms_iter()
                .zip(derivative.chunks_exact(3))
                .enumerate()
            {
                csv.write_record([
                    i.to_string(),
                    atom.element.symbol().to_string(),
                    format!("{:.12}", row[0]),
                    format!("{:.12}", row[1]),
                    format!("{:.12}", row[2]),
                ])?;
            }
        }
        _ => {
            csv.write_record(["index", "value"])?;
            for (i, value) in derivative.iter().enumerate() {
                csv.write_record([i.to_string(), format!("{:.12}", value)])?;
            }
        }
    }
    csv.flush()?;
    Ok(())
}

pub fn write_csv_to_path<P: AsRef<Path>>(
    path: P,
    system: &MolecularSystem,
    derivative: &[f64],
    order: usize,
) -> Result<(), DerivativeExportError> {
    let file = std::fs::File::create(path)?;
    write_csv(file, system, derivative, order)
}
