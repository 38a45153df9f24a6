use crate::core::models::perturbation::PerturbationVector;
use crate::core::models::sequence::Sequence;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// One `<temperature>\t<heat capacity>` line.
pub fn write_heat_capacity_line(
    writer: &mut impl Write,
    temperature: f64,
    heat_capacity: f64,
) -> io::Result<()> {
    writeln!(writer, "{}\t{}", temperature, heat_capacity)
}

/// One `<position> <nucleotide> <epsilon>` line per position.
pub fn write_perturbation_vector(
    writer: &mut impl Write,
    sequence: &Sequence,
    epsilon: &PerturbationVector,
) -> io::Result<()> {
    for (idx, (symbol, value)) in sequence.symbols().zip(epsilon.iter()).enumerate() {
        writeln!(writer, "{} {} {:.6}", idx + 1, symbol, value)?;
    }
    Ok(())
}

pub fn write_checkpoint(
    writer: &mut impl Write,
    iteration: usize,
    score: f64,
    sequence: &Sequence,
    epsilon: &PerturbationVector,
) -> io::Result<()> {
    writeln!(writer, "#iteration {}", iteration)?;
    writeln!(writer, "#score {:.6}", score)?;
    write_perturbation_vector(writer, sequence, epsilon)
}

/// `<prefix>_<iteration>` with the iteration zero-padded to four digits.
pub fn checkpoint_path(prefix: &Path, iteration: usize) -> PathBuf {
    let mut name = prefix.as_os_str().to_owned();
    name.push(format!("_{:04}", iteration));
    PathBuf::from(name)
}

pub fn write_checkpoint_to_path(
    prefix: &Path,
    iteration: usize,
    score: f64,
    sequence: &Sequence,
    epsilon: &PerturbationVector,
) -> io::Result<PathBuf> {
    let path = checkpoint_path(prefix, iteration);
    let file = File::create(&path)?;
    let mut writer = BufWriter::new(file);
    write_checkpoint(&mut writer, iteration, score, sequence, epsilon)?;
    writer.flush()?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn heat_capacity_line_is_tab_separated() {
        let mut out = Vec::new();
        write_heat_capacity_line(&mut out, 15.0, 0.25).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "15\t0.25\n");
    }

    #[test]
    fn perturbation_vector_lines_are_one_based_with_six_decimals() {
        let seq = Sequence::new("GCA").unwrap();
        let eps = PerturbationVector::from_values(vec![0.0, -1.25, 0.5]);
        let mut out = Vec::new();
        write_perturbation_vector(&mut out, &seq, &eps).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "1 G 0.000000\n2 C -1.250000\n3 A 0.500000\n"
        );
    }

    #[test]
    fn checkpoint_path_pads_iteration() {
        let path = checkpoint_path(Path::new("/tmp/run/eps"), 7);
        assert_eq!(path, PathBuf::from("/tmp/run/eps_0007"));
    }

    #[test]
    fn checkpoint_file_has_headers_then_vector() {
        let dir = tempdir().unwrap();
        let seq = Sequence::new("GC").unwrap();
        let eps = PerturbationVector::from_values(vec![0.1, 0.2]);
        let path =
            write_checkpoint_to_path(&dir.path().join("ckpt"), 3, 1.5, &seq, &eps).unwrap();
        assert!(path.ends_with("ckpt_0003"));
        let content = fs::read_to_string(path).unwrap();
        assert_eq!(
            content,
            "#iteration 3\n#score 1.500000\n1 G 0.100000\n2 C 0.200000\n"
        );
    }

    #[test]
    fn checkpoint_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let seq = Sequence::new("GC").unwrap();
        let eps = PerturbationVector::zeros(2);
        let result =
            write_checkpoint_to_path(&dir.path().join("absent/ckpt"), 0, 0.0, &seq, &eps);
        assert!(result.is_err());
    }
}
