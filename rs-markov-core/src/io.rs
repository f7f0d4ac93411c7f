use std::io::Write;
use std::path::{Path, PathBuf};
use std::{fs, io};

use log::{debug, info};
use tempfile::NamedTempFile;

/// Reads a whole UTF-8 corpus file into memory.
pub fn read_corpus<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	fs::read_to_string(filename)
}

/// Concatenates every `.txt` file found directly in `dir`.
///
/// - Files are read in file-name order
/// - Each file is followed by a newline
/// - Subdirectories are ignored
pub fn read_corpus_dir<P: AsRef<Path>>(dir: P) -> io::Result<String> {
	let dir = dir.as_ref();
	let mut corpus = String::new();
	for file in list_files(dir, "txt")? {
		debug!("reading corpus file {file}");
		corpus.push_str(&read_corpus(dir.join(&file))?);
		corpus.push('\n');
	}
	Ok(corpus)
}

/// Cache path for a corpus: `stories/fox.txt` with `"bin"` gives `stories/fox.bin`.
pub fn build_output_path<P: AsRef<Path>>(corpus_path: P, extension: &str) -> io::Result<PathBuf> {
	let corpus_path = corpus_path.as_ref();
	if corpus_path.file_stem().is_none() {
		return Err(io::Error::new(
			io::ErrorKind::InvalidInput,
			format!("corpus path {} has no file name", corpus_path.display()),
		));
	}
	Ok(corpus_path.with_extension(extension))
}

/// Lists all files with a given extension in a directory, sorted by name.
///
/// Returns file names only (no paths).
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	files.sort();
	Ok(files)
}

/// Writes `bytes` to `path` atomically.
///
/// Missing parent directories are created. The data goes to a temporary
/// file in the target directory which is then renamed over `path`, so a
/// reader sees either the old file or the complete new one.
pub fn write_atomic<P: AsRef<Path>>(path: P, bytes: &[u8]) -> io::Result<()> {
	let path = path.as_ref();
	let parent = match path.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
		_ => PathBuf::from("."),
	};
	fs::create_dir_all(&parent)?;

	let mut tmp = NamedTempFile::new_in(&parent)?;
	tmp.write_all(bytes)?;
	tmp.as_file().sync_all()?;
	tmp.persist(path).map_err(|e| e.error)?;

	info!("wrote {} bytes to {}", bytes.len(), path.display());
	Ok(())
}
