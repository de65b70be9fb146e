use std::{fs, io};
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::{Duration, Instant};

/// Reads one class name per line, skipping blank lines.
pub(crate) fn file_to_vec<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
    let file_in = fs::File::open(filename)?;
    let file_reader = BufReader::new(file_in);
    let mut lines = Vec::new();
    for line in file_reader.lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() {
            lines.push(line.to_string());
        }
    }
    Ok(lines)
}

pub(crate) fn trace(l_type: &str, l_step: &str, detect: Instant, _detect_elapsed: Duration) -> Duration {
    log::trace!("{} | Total={:.2?} | {}={:.2?}", l_type, detect.elapsed(), l_step, detect.elapsed() - _detect_elapsed);
    detect.elapsed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_file() {
        let path = std::env::temp_dir().join(format!("y8_labels_{}.txt", std::process::id()));
        fs::write(&path, "person\n\n bicycle \ncar\n").unwrap();
        let labels = file_to_vec(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(labels, vec!["person", "bicycle", "car"]);
    }
}
