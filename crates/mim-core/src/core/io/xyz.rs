use crate::core::io::traits::MolecularFile;
use crate::core::models::atom::Atom;
use crate::core::models::element::Element;
use crate::core::models::ids::AtomId;
use crate::core::models::system::MolecularSystem;
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

const GHOST_PREFIX: char = '@';

#[derive(Debug, Clone, Default, PartialEq)]
pub struct XyzMetadata {
    /// The comment line with any `charge=`/`multiplicity=` tokens removed.
    pub comment: String,
}

#[derive(Debug, Error)]
pub enum XyzError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: XyzParseErrorKind },
    #[error("Header declares {expected} atoms but {found} atom lines were found")]
    AtomCountMismatch { expected: usize, found: usize },
}

#[derive(Debug, Error)]
pub enum XyzParseErrorKind {
    #[error("Invalid atom count '{0}'")]
    InvalidAtomCount(String),
    #[error("Unknown element symbol '{0}'")]
    UnknownElement(String),
    #[error("Invalid coordinate '{0}'")]
    InvalidCoordinate(String),
    #[error("Atom line needs a symbol and three coordinates")]
    MissingField,
    #[error("Invalid value for '{key}': '{value}'")]
    InvalidCommentValue { key: String, value: String },
}

/// The XYZ geometry format.
///
/// The comment line may carry `charge=<int>` and `multiplicity=<int>` tokens. Atom
/// symbols prefixed with `@` are read as ghost atoms.
pub struct XyzFile;

impl MolecularFile for XyzFile {
    type Metadata = XyzMetadata;
    type Error = XyzError;

    fn read_from(
        reader: &mut impl BufRead,
    ) -> Result<(MolecularSystem, Self::Metadata), Self::Error> {
        let mut lines = reader.lines().enumerate();

        let expected = match lines.next() {
            Some((_, line)) => {
                let line = line?;
                line.trim().parse::<usize>().map_err(|_| XyzError::Parse {
                    line: 1,
                    kind: XyzParseErrorKind::InvalidAtomCount(line.trim().to_string()),
                })?
            }
            None => {
                return Err(XyzError::Parse {
                    line: 1,
                    kind: XyzParseErrorKind::InvalidAtomCount(String::new()),
                });
            }
        };

        let comment_line = match lines.next() {
            Some((_, line)) => line?,
            None => String::new(),
        };
        let (charge, multiplicity, comment) = parse_comment(&comment_line)?;

        let mut system = MolecularSystem::new();
        let mut found = 0;
        for (idx, line) in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if found == expected {
                found += 1;
                break;
            }
            let atom = parse_atom_line(&line, idx + 1, AtomId(found))?;
            system.push_atom(atom);
            found += 1;
        }

        if found != expected {
            return Err(XyzError::AtomCountMismatch { expected, found });
        }

        let electrons = system.electron_count() - i64::from(charge);
        let multiplicity =
            multiplicity.unwrap_or(if electrons.rem_euclid(2) == 0 { 1 } else { 2 });
        let system = system.with_charge(charge, multiplicity);

        Ok((system, XyzMetadata { comment }))
    }

    fn write_to(
        system: &MolecularSystem,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        writeln!(writer, "{}", system.len())?;
        let mut comment = metadata.comment.trim().to_string();
        if system.charge() != 0 || system.multiplicity() != 1 {
            if !comment.is_empty() {
                comment.push(' ');
            }
            comment.push_str(&format!(
                "charge={} multiplicity={}",
                system.charge(),
                system.multiplicity()
            ));
        }
        writeln!(writer, "{}", comment)?;
        for atom in system.atoms_iter() {
            let symbol = if atom.ghost {
                format!("{}{}", GHOST_PREFIX, atom.element.symbol())
            } else {
                atom.element.symbol().to_string()
            };
            writeln!(
                writer,
                "{:<3} {:>14.8} {:>14.8} {:>14.8}",
                symbol, atom.position.x, atom.position.y, atom.position.z
            )?;
        }
        Ok(())
    }
}

fn parse_comment(line: &str) -> Result<(i32, Option<u32>, String), XyzError> {
    let mut charge = 0;
    let mut multiplicity = None;
    let mut rest = Vec::new();

    for token in line.split_whitespace() {
        match token.split_once('=') {
            Some((key, value)) if key.eq_ignore_ascii_case("charge") => {
                charge = value.parse().map_err(|_| comment_error(key, value))?;
            }
            Some((key, value)) if key.eq_ignore_ascii_case("multiplicity") => {
                multiplicity = Some(value.parse().map_err(|_| comment_error(key, value))?);
            }
            _ => rest.push(token),
        }
    }
    Ok((charge, multiplicity, rest.join(" ")))
}

fn comment_error(key: &str, value: &str) -> XyzError {
    XyzError::Parse {
        line: 2,
        kind: XyzParseErrorKind::InvalidCommentValue {
            key: key.to_string(),
            value: value.to_string(),
        },
    }
}

fn parse_atom_line(line: &str, line_num: usize, id: AtomId) -> Result<Atom, XyzError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(XyzError::Parse {
            line: line_num,
            kind: XyzParseErrorKind::MissingField,
        });
    }

    let (symbol, ghost) = match fields[0].strip_prefix(GHOST_PREFIX) {
        Some(stripped) => (stripped, true),
        None => (fields[0], false),
    };
    let element = Element::from_symbol(symbol).ok_or_else(|| XyzError::Parse {
        line: line_num,
        kind: XyzParseErrorKind::UnknownElement(fields[0].to_string()),
    })?;

    let mut coords = [0.0; 3];
    for (coord, field) in coords.iter_mut().zip(&fields[1..4]) {
        *coord = field.parse().map_err(|_| XyzError::Parse {
            line: line_num,
            kind: XyzParseErrorKind::InvalidCoordinate(field.to_string()),
        })?;
    }

    let atom = Atom::new(id, element, Point3::from(coords));
    Ok(if ghost { atom.to_ghost() } else { atom })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const WATER: &str = "3\nwater monomer\nO 0.000 0.000 0.000\nH 0.957 0.000 0.000\nH -0.240 0.927 0.000\n";

    #[test]
    fn reads_atoms_in_file_order() {
        let (system, metadata) = XyzFile::read_from(&mut Cursor::new(WATER)).unwrap();
        assert_eq!(system.len(), 3);
        assert_eq!(metadata.comment, "water monomer");
        let symbols: Vec<_> = system.atoms_iter().map(|a| a.element.symbol()).collect();
        assert_eq!(symbols, vec!["O", "H", "H"]);
        assert_eq!(system.atoms()[2].position, Point3::new(-0.240, 0.927, 0.0));
        assert_eq!(system.atoms()[1].id, AtomId(1));
    }

    #[test]
    fn reads_charge_and_multiplicity_from_comment() {
        let input = "1\nhydroxide charge=-1 multiplicity=1\nO 0 0 0\n";
        let (system, metadata) = XyzFile::read_from(&mut Cursor::new(input)).unwrap();
        assert_eq!(system.charge(), -1);
        assert_eq!(system.multiplicity(), 1);
        assert_eq!(metadata.comment, "hydroxide");
    }

    #[test]
    fn infers_doublet_for_odd_electron_count() {
        let input = "1\n\nH 0 0 0\n";
        let (system, _) = XyzFile::read_from(&mut Cursor::new(input)).unwrap();
        assert_eq!(system.multiplicity(), 2);
    }

    #[test]
    fn reads_ghost_atoms() {
        let input = "2\n\nHe 0 0 0\n@He 0 0 3\n";
        let (system, _) = XyzFile::read_from(&mut Cursor::new(input)).unwrap();
        assert!(!system.atoms()[0].ghost);
        assert!(system.atoms()[1].ghost);
        assert_eq!(system.electron_count(), 2);
    }

    #[test]
    fn rejects_atom_count_mismatch() {
        let input = "3\n\nHe 0 0 0\n";
        let err = XyzFile::read_from(&mut Cursor::new(input)).unwrap_err();
        assert!(matches!(
            err,
            XyzError::AtomCountMismatch {
                expected: 3,
                found: 1
            }
        ));
    }

    #[test]
    fn rejects_unknown_element() {
        let input = "1\n\nQq 0 0 0\n";
        let err = XyzFile::read_from(&mut Cursor::new(input)).unwrap_err();
        assert!(matches!(
            err,
            XyzError::Parse {
                line: 3,
                kind: XyzParseErrorKind::UnknownElement(_)
            }
        ));
    }

    #[test]
    fn rejects_bad_coordinates_and_headers() {
        let err = XyzFile::read_from(&mut Cursor::new("1\n\nHe 0 x 0\n")).unwrap_err();
        assert!(matches!(
            err,
            XyzError::Parse {
                kind: XyzParseErrorKind::InvalidCoordinate(_),
                ..
            }
        ));
        let err = XyzFile::read_from(&mut Cursor::new("three\n\n")).unwrap_err();
        assert!(matches!(
            err,
            XyzError::Parse {
                line: 1,
                kind: XyzParseErrorKind::InvalidAtomCount(_)
            }
        ));
    }

    #[test]
    fn written_file_reads_back_identically() {
        let input = "2\ncation charge=1 multiplicity=2\nHe 0 0 0\n@H 0 0 1.5\n";
        let (system, metadata) = XyzFile::read_from(&mut Cursor::new(input)).unwrap();
        let mut buffer = Vec::new();
        XyzFile::write_to(&system, &metadata, &mut buffer).unwrap();
        let (reread, remeta) = XyzFile::read_from(&mut Cursor::new(buffer)).unwrap();
        assert_eq!(reread, system);
        assert_eq!(remeta, metadata);
    }

    #[test]
    fn path_round_trip_through_tempdir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("water.xyz");
        std::fs::write(&path, WATER).unwrap();
        let (system, _) = XyzFile::read_from_path(&path).unwrap();
        assert_eq!(system.electron_count(), 10);
    }
}
