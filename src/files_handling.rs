
// file access shared by the loader, the n-gram extractor and the exporters

use crate::error::{ManifoldError, Result};

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use flate2::read::GzDecoder;
use ndarray::Array2;
use ndarray_npy::write_npy;
use serde_json::{Map, Value};


/// `path` with `.gz` appended, where a compressed copy of an input may live.
pub fn gz_sibling(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".gz");
    PathBuf::from(name)
}

/// True when either the plain or the gzipped copy of `path` is present.
pub fn input_exists(path: &Path) -> bool {
    path.exists() || gz_sibling(path).exists()
}

/// Opens an input for line reading. Files ending in `.gz` are decompressed on the fly,
/// and a missing plain file falls back to its gzipped sibling.
pub fn open_lines(path: &Path) -> Result<Box<dyn BufRead>> {

    let (actual, gzipped) = if path.exists() {
        (path.to_path_buf(), path.extension().map_or(false, |ext| ext == "gz"))
    } else {
        let gz = gz_sibling(path);
        if !gz.exists() {
            return Err(ManifoldError::MissingInput { path: path.to_path_buf() });
        }
        (gz, true)
    };

    let f = File::open(&actual).map_err(|e| ManifoldError::on_read(&actual, e))?;
    if gzipped {
        Ok(Box::new(BufReader::new(GzDecoder::new(f))))
    } else {
        Ok(Box::new(BufReader::new(f)))
    }
}

/// Writes a whole text document, creating the parent folder when needed.
pub fn write_text(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ManifoldError::on_write(parent, e))?;
    }
    let f = File::create(path).map_err(|e| ManifoldError::on_write(path, e))?;
    let mut writer = BufWriter::new(f);
    writer.write_all(contents.as_bytes()).map_err(|e| ManifoldError::on_write(path, e))?;
    writer.flush().map_err(|e| ManifoldError::on_write(path, e))?;
    Ok(())
}


pub fn read_input<R: ReadFile>(file_path: &Path) -> Result<<R as ReadFile>::Item> {
    <R as ReadFile>::read_file(file_path)
}

/// Saves `item` as `output_dir/file_name.<ext>` and returns the written path.
pub fn save_output<S: SaveFile>(output_dir: &Path, file_name: &str, item: &S) -> Result<PathBuf> {

    // create output folder
    fs::create_dir_all(output_dir).map_err(|e| ManifoldError::on_write(output_dir, e))?;
    item.save_file(output_dir, file_name)
}

pub trait ReadFile {
    type Item;
    fn read_file(file_path: &Path) -> Result<Self::Item>;
}

impl ReadFile for Map<String, Value> {
    type Item = Self;
    fn read_file(file_path: &Path) -> Result<Self::Item> {
        let reader = open_lines(file_path)?;
        let item = serde_json::from_reader(reader)?;
        Ok(item)
    }
}

pub trait SaveFile {
    fn save_file(&self, output_dir: &Path, file_name: &str) -> Result<PathBuf>;
}

impl SaveFile for Array2<f64> {
    fn save_file(&self, output_dir: &Path, file_name: &str) -> Result<PathBuf> {
        let out = output_dir.join(format!("{}.npy", file_name));
        write_npy(&out, self)?;
        Ok(out)
    }
}

impl SaveFile for Map<String, Value> {
    fn save_file(&self, output_dir: &Path, file_name: &str) -> Result<PathBuf> {
        let out = output_dir.join(format!("{}.json", file_name));
        let f = File::create(&out).map_err(|e| ManifoldError::on_write(&out, e))?;
        let mut writer = BufWriter::new(f);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n").map_err(|e| ManifoldError::on_write(&out, e))?;
        writer.flush().map_err(|e| ManifoldError::on_write(&out, e))?;
        Ok(out)
    }
}
