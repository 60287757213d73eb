use super::defaults::{KNOWN_RECORDERS, MAX_CODEC_CHARS, MAX_EXTENSION_CHARS};
use super::{AppConfig, MAX_CRF};
use anyhow::{anyhow, bail, Context, Result};
use std::{fs, path::Path};

impl AppConfig {
    /// Check CLI values and normalize paths.
    pub fn validate(&mut self) -> Result<()> {
        if self.crf > MAX_CRF {
            bail!("--crf must be between 0 and {MAX_CRF}, got {}", self.crf);
        }

        let codec = self.codec.trim().to_string();
        if codec.is_empty() || codec.len() > MAX_CODEC_CHARS {
            bail!("--codec must be between 1 and {MAX_CODEC_CHARS} characters");
        }
        if !codec
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
        {
            bail!("--codec must contain only ASCII letters, digits, '_' or '-', got '{codec}'");
        }
        self.codec = codec;

        self.extension = sanitize_extension(&self.extension)?;
        self.recorder_cmd = sanitize_binary(&self.recorder_cmd, "--recorder-cmd", KNOWN_RECORDERS)?;

        let dir = &self.output_dir;
        let canonical = dir
            .canonicalize()
            .with_context(|| format!("failed to canonicalize --dir '{}'", dir.display()))?;
        if !canonical.is_dir() {
            bail!("--dir '{}' is not a directory", canonical.display());
        }
        self.output_dir = canonical;

        Ok(())
    }
}

/// Extensions are a dot followed by a short run of ASCII alphanumerics.
pub(super) fn sanitize_extension(value: &str) -> Result<String> {
    let trimmed = value.trim();
    let Some(body) = trimmed.strip_prefix('.') else {
        bail!("--extension must start with '.', got '{trimmed}'");
    };
    if body.is_empty() || body.len() > MAX_EXTENSION_CHARS {
        bail!("--extension must have between 1 and {MAX_EXTENSION_CHARS} characters after '.'");
    }
    if !body.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        bail!("--extension must contain only ASCII letters or digits after '.', got '{trimmed}'");
    }
    Ok(trimmed.to_string())
}

/// Allow either a known binary name or a path to an executable file.
pub(super) fn sanitize_binary(value: &str, flag: &str, allowlist: &[&str]) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("{flag} cannot be empty");
    }
    if let Some(allowed) = allowlist
        .iter()
        .find(|candidate| candidate.eq_ignore_ascii_case(trimmed))
    {
        return Ok((*allowed).to_string());
    }

    let path = Path::new(trimmed);
    if path.is_absolute() || trimmed.contains(std::path::MAIN_SEPARATOR) {
        let canonical = path
            .canonicalize()
            .with_context(|| format!("failed to canonicalize {flag} '{trimmed}'"))?;
        let metadata = fs::metadata(&canonical)
            .with_context(|| format!("failed to inspect {flag} '{}'", canonical.display()))?;
        if !metadata.is_file() {
            bail!("{flag} '{}' is not a file", canonical.display());
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = metadata.permissions().mode();
            if mode & 0o111 == 0 {
                bail!(
                    "{flag} '{}' exists but is not executable (mode {:o})",
                    canonical.display(),
                    mode
                );
            }
        }
        return canonical
            .to_str()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow!("{flag} must be valid UTF-8"));
    }

    bail!("{flag} must be one of {allowlist:?} or an existing binary path");
}
