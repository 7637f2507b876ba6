use flate2::read::GzDecoder;
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tar::Archive;
use walkdir::WalkDir;
use zip::ZipArchive;

use crate::error::{NovaError, Result};

static INPUT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(input|include)\{([^}]+)\}").expect("Invalid input regex pattern")
});

/// Name given to a source that arrives as a single gzip-compressed file
pub const SINGLE_FILE_NAME: &str = "main.tex";

/// Unpack an e-print archive into `output_dir`.
///
/// arXiv serves ZIP, tar.gz, or a lone gzip-compressed `.tex` file; the
/// formats are tried in that order.
pub fn extract_archive<R: Read + Seek>(mut archive: R, output_dir: &Path) -> Result<()> {
    if let Ok(mut zip) = ZipArchive::new(&mut archive) {
        info!("Extracting ZIP archive");
        for i in 0..zip.len() {
            let mut file = zip.by_index(i)?;
            let outpath = match file.enclosed_name() {
                Some(path) => output_dir.join(path),
                None => continue,
            };

            if file.name().ends_with('/') {
                fs::create_dir_all(&outpath)?;
            } else {
                if let Some(p) = outpath.parent() {
                    fs::create_dir_all(p)?;
                }
                let mut outfile = fs::File::create(&outpath)?;
                io::copy(&mut file, &mut outfile)?;
            }
        }
        return Ok(());
    }

    archive.seek(SeekFrom::Start(0))?;
    info!("Trying to extract as TAR.GZ archive");
    let unpacked = {
        let mut tar = Archive::new(GzDecoder::new(&mut archive));
        tar.unpack(output_dir)
    };
    match unpacked {
        Ok(()) => Ok(()),
        Err(e) => {
            debug!("Not a tar archive ({}), treating as a single gzip file", e);
            archive.seek(SeekFrom::Start(0))?;
            let mut content = String::new();
            GzDecoder::new(&mut archive)
                .read_to_string(&mut content)
                .map_err(|e| NovaError::Download(format!("unrecognized source format: {}", e)))?;
            fs::write(output_dir.join(SINGLE_FILE_NAME), content)?;
            Ok(())
        }
    }
}

fn tex_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(2)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.path().is_file() && entry.path().extension().is_some_and(|ext| ext == "tex")
        })
        .map(|entry| entry.path().to_path_buf())
        .collect();
    files.sort();
    files
}

/// Find the main LaTeX file in an unpacked source tree
pub fn find_main_tex_file(dir: &Path) -> Result<PathBuf> {
    let main = dir.join("main.tex");
    if main.is_file() {
        return Ok(main);
    }

    let tex_files = tex_files(dir);

    // arXiv-specific builds are usually named foo-arxiv.tex or foo_review.tex
    let tagged = tex_files.iter().find(|path| {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().to_lowercase())
            .is_some_and(|stem| stem.contains("arxiv") || stem.contains("review"))
    });
    if let Some(path) = tagged {
        return Ok(path.clone());
    }

    for name in ["paper.tex", "article.tex", "manuscript.tex"] {
        let path = dir.join(name);
        if path.is_file() {
            return Ok(path);
        }
    }

    for file in &tex_files {
        if let Ok(content) = fs::read_to_string(file) {
            if content.contains("\\documentclass") {
                return Ok(file.clone());
            }
        }
    }

    tex_files
        .into_iter()
        .next()
        .ok_or_else(|| NovaError::MainFileNotFound(dir.to_path_buf()))
}

/// Read the main file with every `\input`/`\include` inlined.
///
/// Returns the full text and the included files (main file excluded).
pub fn extract_all_latex_from_files(base_dir: &Path, main_tex_file: &Path) -> Result<(String, Vec<PathBuf>)> {
    let mut processed_files = Vec::new();
    let content = extract_latex_content(base_dir, main_tex_file, &mut processed_files)?;
    let included_files = processed_files.into_iter().skip(1).collect();
    Ok((content, included_files))
}

fn extract_latex_content(base_dir: &Path, tex_file: &Path, processed_files: &mut Vec<PathBuf>) -> Result<String> {
    if processed_files.iter().any(|p| p == tex_file) {
        return Ok(String::new());
    }
    processed_files.push(tex_file.to_path_buf());

    let bytes = fs::read(tex_file)?;
    let content = String::from_utf8_lossy(&bytes);

    let mut result = String::with_capacity(content.len());
    let mut last_end = 0;
    for cap in INPUT_REGEX.captures_iter(&content) {
        let (Some(full_match), Some(filename)) = (cap.get(0), cap.get(2)) else {
            continue;
        };
        result.push_str(&content[last_end..full_match.start()]);
        last_end = full_match.end();

        match resolve_input_path(base_dir, filename.as_str().trim()) {
            Some(input_path) => {
                let included = extract_latex_content(base_dir, &input_path, processed_files)?;
                result.push_str(&included);
            }
            None => debug!("Skipping unresolved input: {}", filename.as_str()),
        }
    }
    result.push_str(&content[last_end..]);

    Ok(result)
}

/// Resolve the path of an `\input` target, with or without the `.tex` extension
pub fn resolve_input_path(base_dir: &Path, filename: &str) -> Option<PathBuf> {
    let direct_path = base_dir.join(filename);
    if direct_path.is_file() {
        return Some(direct_path);
    }

    if !filename.ends_with(".tex") {
        let path_with_extension = base_dir.join(format!("{}.tex", filename));
        if path_with_extension.is_file() {
            return Some(path_with_extension);
        }
    }

    None
}
