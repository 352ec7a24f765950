use mimpp::core::models::system_map::SystemMap;
use mimpp::engine::report::{DerivMap, ResultReporter};
use std::io::{self, Write};
use std::sync::Mutex;

const INDENT: &str = "  ";
const NAME_WIDTH: usize = 16;
const VALUE_WIDTH: usize = 16;

/// Plain-text rendering of per-fragment energies and gradients.
pub struct TableReporter<W: Write> {
    out: Mutex<W>,
}

impl TableReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TableReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn with_out<F>(&self, f: F) -> io::Result<()>
    where
        F: FnOnce(&mut W) -> io::Result<()>,
    {
        let mut guard = match self.out.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)?;
        guard.flush()
    }
}

fn rule(out: &mut impl Write, columns: usize) -> io::Result<()> {
    writeln!(
        out,
        "{}{}",
        INDENT,
        "-".repeat(NAME_WIDTH + columns * (VALUE_WIDTH + 1))
    )
}

impl<W: Write> ResultReporter for TableReporter<W> {
    fn render_energy_table(&self, rows: &[String], derivs: &DerivMap) -> io::Result<()> {
        self.with_out(|out| {
            writeln!(out, "{}Fragment energies", INDENT)?;
            rule(out, 1)?;
            writeln!(
                out,
                "{}{:<NAME_WIDTH$} {:>VALUE_WIDTH$}",
                INDENT, "Subsystem", "Energy"
            )?;
            rule(out, 1)?;
            for name in rows {
                match derivs.get(name).and_then(|values| values.first()) {
                    Some(energy) => writeln!(
                        out,
                        "{}{:<NAME_WIDTH$} {:>VALUE_WIDTH$.8}",
                        INDENT, name, energy
                    )?,
                    None => writeln!(out, "{}{:<NAME_WIDTH$} {:>VALUE_WIDTH$}", INDENT, name, "-")?,
                }
            }
            rule(out, 1)
        })
    }

    fn render_gradient_table(
        &self,
        rows: &[String],
        derivs: &DerivMap,
        systems: &SystemMap,
    ) -> io::Result<()> {
        self.with_out(|out| {
            writeln!(out, "{}Fragment gradients", INDENT)?;
            for name in rows {
                let (Some(values), Some(system)) = (derivs.get(name), systems.get(name)) else {
                    continue;
                };
                writeln!(out)?;
                writeln!(out, "{}Subsystem {}", INDENT, name)?;
                rule(out, 3)?;
                writeln!(
                    out,
                    "{}{:<NAME_WIDTH$} {:>VALUE_WIDTH$} {:>VALUE_WIDTH$} {:>VALUE_WIDTH$}",
                    INDENT, "Atom", "dE/dx", "dE/dy", "dE/dz"
                )?;
                rule(out, 3)?;
                for (atom, g) in system.atoms_iter().zip(values.chunks_exact(3)) {
                    let label = format!(
                        "{}{} {}",
                        if atom.ghost { "@" } else { "" },
                        atom.element,
                        atom.id
                    );
                    writeln!(
                        out,
                        "{}{:<NAME_WIDTH$} {:>VALUE_WIDTH$.8} {:>VALUE_WIDTH$.8} {:>VALUE_WIDTH$.8}",
                        INDENT, label, g[0], g[1], g[2]
                    )?;
                }
                rule(out, 3)?;
            }
            Ok(())
        })
    }
}

/// Prints the accumulated whole-system result to stdout.
pub fn print_summary(order: usize, atoms: usize, derivative: &[f64]) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let _ = write_summary(&mut out, order, atoms, derivative);
}

fn write_summary(
    out: &mut impl Write,
    order: usize,
    atoms: usize,
    derivative: &[f64],
) -> io::Result<()> {
    writeln!(out)?;
    match order {
        0 => writeln!(
            out,
            "{}Total energy: {:.10}",
            INDENT,
            derivative.first().copied().unwrap_or_default()
        ),
        1 => {
            let norm = derivative.iter().map(|g| g * g).sum::<f64>().sqrt();
            writeln!(out, "{}Total gradient ({} atoms), norm {:.10}", INDENT, atoms, norm)?;
            for (i, g) in derivative.chunks_exact(3).enumerate() {
                writeln!(
                    out,
                    "{}{:>6} {:>VALUE_WIDTH$.10} {:>VALUE_WIDTH$.10} {:>VALUE_WIDTH$.10}",
                    INDENT, i, g[0], g[1], g[2]
                )?;
            }
            Ok(())
        }
        _ => writeln!(
            out,
            "{}Derivative of order {}: {} values (3N = {})",
            INDENT,
            order,
            derivative.len(),
            3 * atoms
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimpp::core::io::traits::MolecularFile;
    use mimpp::core::io::xyz::XyzFile;

    fn dimer_map() -> SystemMap {
        let xyz = "2\nargon dimer\nAr 0.0 0.0 0.0\n@Ar 3.8 0.0 0.0\n";
        let (system, _) = XyzFile::read_from(&mut xyz.as_bytes()).unwrap();
        let mut map = SystemMap::new();
        map.insert("(0,1)", system).unwrap();
        map
    }

    fn render_to_string<F>(f: F) -> String
    where
        F: FnOnce(&TableReporter<Vec<u8>>) -> io::Result<()>,
    {
        let reporter = TableReporter::new(Vec::new());
        f(&reporter).unwrap();
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn energy_table_lists_rows_in_order() {
        let mut derivs = DerivMap::new();
        derivs.insert("(1)".to_string(), vec![-0.5]);
        derivs.insert("(0)".to_string(), vec![1.25]);
        let rows = vec!["(1)".to_string(), "(0)".to_string(), "(2)".to_string()];
        let text = render_to_string(|r| r.render_energy_table(&rows, &derivs));

        let first = text.find("(1)").unwrap();
        let second = text.find("(0)").unwrap();
        assert!(first < second);
        assert!(text.contains("-0.50000000"));
        assert!(text.contains("1.25000000"));
        assert!(text.lines().any(|line| line.contains("(2)") && line.trim_end().ends_with('-')));
    }

    #[test]
    fn gradient_table_labels_atoms_and_ghosts() {
        let systems = dimer_map();
        let mut derivs = DerivMap::new();
        derivs.insert("(0,1)".to_string(), vec![1.0, 0.0, 0.0, -1.0, 0.0, 0.0]);
        let rows = vec!["(0,1)".to_string()];
        let text = render_to_string(|r| r.render_gradient_table(&rows, &derivs, &systems));

        assert!(text.contains("Subsystem (0,1)"));
        assert!(text.contains("Ar #0"));
        assert!(text.contains("@Ar #1"));
        assert!(text.contains("-1.00000000"));
    }

    #[test]
    fn summary_reports_energy_and_gradient_norm() {
        let mut energy = Vec::new();
        write_summary(&mut energy, 0, 2, &[-0.25]).unwrap();
        assert!(String::from_utf8(energy).unwrap().contains("Total energy: -0.2500000000"));

        let mut gradient = Vec::new();
        write_summary(&mut gradient, 1, 1, &[3.0, 4.0, 0.0]).unwrap();
        let text = String::from_utf8(gradient).unwrap();
        assert!(text.contains("norm 5.0000000000"));

        let mut hessian = Vec::new();
        write_summary(&mut hessian, 2, 1, &[0.0; 9]).unwrap();
        assert!(String::from_utf8(hessian).unwrap().contains("9 values"));
    }
}
