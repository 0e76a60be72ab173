use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File, directory and character encoding utilities

/// Text decoded from input bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    /// Decoded text, byte order mark removed
    pub text: String,
    /// Canonical name of the encoding used
    pub encoding: String,
    /// Whether the input started with a byte order mark
    pub has_bom: bool,
}

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @generates: Output path for a localized document
    // @params: input_file, output_dir, locale
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        locale: &str,
    ) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file.file_stem().unwrap_or_default();

        let mut output_filename = stem.to_string_lossy().to_string();
        output_filename.push('.');
        output_filename.push_str(locale);
        if let Some(extension) = input_file.extension() {
            output_filename.push('.');
            output_filename.push_str(&extension.to_string_lossy());
        }

        output_dir.as_ref().join(output_filename)
    }

    /// Find files with one of the given extensions in a directory
    pub fn find_files<P: AsRef<Path>>(dir: P, extensions: &[&str]) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                let matches = path.extension().is_some_and(|ext| {
                    let ext = ext.to_string_lossy();
                    extensions
                        .iter()
                        .any(|wanted| ext.eq_ignore_ascii_case(wanted.trim_start_matches('.')))
                });
                if matches {
                    result.push(path.to_path_buf());
                }
            }
        }

        result.sort();
        Ok(result)
    }

    /// Expand an input path into the documents to process
    pub fn collect_inputs<P: AsRef<Path>>(path: P, extensions: &[&str]) -> Result<Vec<PathBuf>> {
        let path = path.as_ref();
        if Self::file_exists(path) {
            Ok(vec![path.to_path_buf()])
        } else if Self::dir_exists(path) {
            Self::find_files(path, extensions)
        } else {
            Err(anyhow!("Input path does not exist: {:?}", path))
        }
    }

    /// Decode bytes, honouring a byte order mark before `default_encoding`
    pub fn decode_bytes(bytes: &[u8], default_encoding: &str) -> Result<DecodedText> {
        let (encoding, body, has_bom) = match Encoding::for_bom(bytes) {
            Some((encoding, bom_len)) => (encoding, &bytes[bom_len..], true),
            None => (Self::encoding_for_label(default_encoding)?, bytes, false),
        };

        let (text, had_errors) = encoding.decode_without_bom_handling(body);
        if had_errors {
            warn!(
                "Input is not valid {}; malformed sequences were replaced",
                encoding.name()
            );
        }

        Ok(DecodedText {
            text: text.into_owned(),
            encoding: encoding.name().to_string(),
            has_bom,
        })
    }

    /// Encode text for output. `with_bom` applies to UTF-8 and UTF-16.
    /// Characters the encoding cannot represent become numeric character references.
    pub fn encode_text(text: &str, encoding_label: &str, with_bom: bool) -> Result<Vec<u8>> {
        let encoding = Self::encoding_for_label(encoding_label)?;

        if encoding == UTF_16LE || encoding == UTF_16BE {
            let little_endian = encoding == UTF_16LE;
            let mut bytes = Vec::with_capacity(text.len() * 2 + 2);
            if with_bom {
                bytes.extend_from_slice(if little_endian { &[0xFF, 0xFE] } else { &[0xFE, 0xFF] });
            }
            for unit in text.encode_utf16() {
                let pair = if little_endian {
                    unit.to_le_bytes()
                } else {
                    unit.to_be_bytes()
                };
                bytes.extend_from_slice(&pair);
            }
            return Ok(bytes);
        }

        if encoding == UTF_8 {
            let mut bytes = Vec::with_capacity(text.len() + 3);
            if with_bom {
                bytes.extend_from_slice(&[0xEF, 0xBB, 0xBF]);
            }
            bytes.extend_from_slice(text.as_bytes());
            return Ok(bytes);
        }

        let (bytes, _, had_errors) = encoding.encode(text);
        if had_errors {
            warn!(
                "Some characters cannot be represented in {} and were written as character references",
                encoding.name()
            );
        }
        Ok(bytes.into_owned())
    }

    /// Resolve an encoding label such as `utf-8` or `latin1`
    pub fn encoding_for_label(label: &str) -> Result<&'static Encoding> {
        Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unsupported encoding: {}", label))
    }

    /// Write bytes to a file, creating parent directories
    pub fn write_output<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                Self::ensure_dir(parent)?;
            }
        }
        fs::write(path, bytes).with_context(|| format!("Failed to write output file: {:?}", path))
    }
}
