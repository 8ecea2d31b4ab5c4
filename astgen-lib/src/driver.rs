//! This module sequences emission and owns writing the generated files.

use crate::{
    emitter::{
        GeneratedUnit, MalformedFieldError, Prelude, DECLARATION_EXTENSION, DEFINITION_EXTENSION,
    },
    formatter::Formatter,
    schema::{check_shared_unit, FamilySpec, SchemaError},
};
use std::{
    ffi::OsString,
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, info, instrument};

/// An error that can be returned from [`Driver::run`].
#[derive(Debug, Error)]
pub enum GenerateError {
    /// A family was badly described. Nothing has been written.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A field entry couldn't be split. Files from earlier jobs have been written.
    #[error("{0}")]
    MalformedField(#[from] MalformedFieldError),

    /// Writing a file failed. Files from earlier jobs have been written.
    #[error("Failed to write `{}`: {source}", .path.display())]
    Io {
        /// The file that couldn't be written.
        path: PathBuf,

        /// The underlying I/O error.
        source: io::Error,
    },
}

/// Families to be emitted, in order, into one header and one source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputJob {
    /// The path of the generated files, without an extension.
    pub base_name: PathBuf,

    /// The includes at the top of the header.
    pub prelude: Prelude,

    /// The families, in dependency order.
    pub families: Vec<FamilySpec>,
}

impl OutputJob {
    /// Create a job with no families.
    pub fn new(base_name: impl Into<PathBuf>, prelude: Prelude) -> Self {
        Self {
            base_name: base_name.into(),
            prelude,
            families: Vec::new(),
        }
    }

    /// Add a family after the ones already in this job.
    pub fn family(mut self, family: FamilySpec) -> Self {
        self.families.push(family);
        self
    }

    /// The path of the file with the given extension.
    fn path_with_extension(&self, dir: &Path, extension: &str) -> PathBuf {
        let mut file_name = OsString::from(self.base_name.as_os_str());
        file_name.push(".");
        file_name.push(extension);
        dir.join(file_name)
    }

    /// The name the source file uses to include the header.
    fn header_stem(&self) -> String {
        self.base_name
            .file_name()
            .map_or_else(String::new, |name| name.to_string_lossy().into_owned())
    }

    /// Emit every family into one unit, all or nothing.
    fn emit(&self) -> Result<GeneratedUnit, MalformedFieldError> {
        let mut unit = GeneratedUnit::new(&self.header_stem(), &self.prelude);
        for family in &self.families {
            unit.push_family(family)?;
        }
        Ok(unit)
    }
}

/// The paths of one generated header and source file pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedFiles {
    /// The path of the header.
    pub declarations: PathBuf,

    /// The path of the source file.
    pub definitions: PathBuf,
}

/// Runs output jobs: checks them, emits them, writes them, and formats them.
#[derive(Clone, Debug, Default)]
pub struct Driver {
    /// The directory that relative base names are resolved against.
    dir: PathBuf,

    /// The formatter to run over the written files, if any.
    formatter: Option<Formatter>,
}

impl Driver {
    /// Create a driver that writes into the current directory and doesn't format anything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative base names against this directory instead.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    /// Run this formatter over each pair of written files.
    pub fn with_formatter(mut self, formatter: Option<Formatter>) -> Self {
        self.formatter = formatter;
        self
    }

    /// Generate every job, in order.
    ///
    /// Every schema is checked before anything is written. After that, each job is emitted in
    /// full before its files are opened, so a malformed field never leaves a partial pair behind,
    /// but the files of earlier jobs are kept. Existing files are overwritten.
    #[instrument(skip_all, fields(jobs = jobs.len()))]
    pub fn run(&self, jobs: &[OutputJob]) -> Result<Vec<GeneratedFiles>, GenerateError> {
        for job in jobs {
            check_shared_unit(&job.families)?;
        }

        let mut written = Vec::with_capacity(jobs.len());
        for job in jobs {
            let unit = job.emit()?;
            written.push(self.write(job, &unit)?);
        }

        if let Some(formatter) = &self.formatter {
            for files in &written {
                formatter.format(files);
            }
        }

        Ok(written)
    }

    /// Write the unit for the job, replacing any existing files.
    fn write(&self, job: &OutputJob, unit: &GeneratedUnit) -> Result<GeneratedFiles, GenerateError> {
        let files = GeneratedFiles {
            declarations: job.path_with_extension(&self.dir, DECLARATION_EXTENSION),
            definitions: job.path_with_extension(&self.dir, DEFINITION_EXTENSION),
        };

        write_file(&files.declarations, &unit.declarations)?;
        write_file(&files.definitions, &unit.definitions)?;

        info!(
            declarations = %files.declarations.display(),
            definitions = %files.definitions.display(),
            "Wrote generated files"
        );
        Ok(files)
    }
}

/// Write the text to the file, truncating it first.
fn write_file(path: &Path, contents: &str) -> Result<(), GenerateError> {
    debug!(path = %path.display(), bytes = contents.len(), "Writing file");
    fs::write(path, contents).map_err(|source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    })
}
