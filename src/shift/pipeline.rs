//! File pipeline
//!
//! Picks a direction per file from its extension, mirrors directory trees and converts every
//! matching file. The first failure stops the run; a destination that was partially written
//! by the failing conversion is removed, so a destination file is always either complete or
//! absent.

use crate::shift::config::{PipelineConfig, ShiftConfig};
use crate::shift::convert::{convert_with, ConvertOptions};
use crate::shift::error::ConvertError;
use crate::shift::transforms::Direction;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Which kinds of source files a run converts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Typed files are stripped and untyped files annotated
    #[default]
    Auto,
    Strip,
    Annotate,
}

impl Mode {
    fn allows(self, direction: Direction) -> bool {
        match self {
            Mode::Auto => true,
            Mode::Strip => direction == Direction::StripTypes,
            Mode::Annotate => direction == Direction::AddPlaceholders,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode '{0}' (expected auto, strip or annotate)")]
pub struct ParseModeError(String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Mode::Auto),
            "strip" => Ok(Mode::Strip),
            "annotate" => Ok(Mode::Annotate),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to convert {}: {source}", .path.display())]
    Convert {
        path: PathBuf,
        source: ConvertError,
    },
    #[error("{}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Walk(#[from] walkdir::Error),
    #[error("no conversion applies to {}", .0.display())]
    UnsupportedExtension(PathBuf),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> PipelineError + '_ {
    move |source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Outcome of a run: written destinations and source files that matched no conversion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub converted: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

pub struct Pipeline {
    config: PipelineConfig,
    options: ConvertOptions,
    mode: Mode,
}

impl Pipeline {
    pub fn new(config: &ShiftConfig, mode: Mode) -> Self {
        Pipeline {
            config: config.pipeline.clone(),
            options: config.convert_options(),
            mode,
        }
    }

    /// The conversion a file gets, if any
    pub fn direction_for(&self, path: &Path) -> Option<Direction> {
        let extension = path.extension()?.to_str()?;
        let direction = if extension == self.config.strip_extension {
            if self.config.skip_declaration_files && self.is_declaration_file(path) {
                return None;
            }
            Direction::StripTypes
        } else if extension == self.config.annotate_extension {
            Direction::AddPlaceholders
        } else {
            return None;
        };
        self.mode.allows(direction).then_some(direction)
    }

    fn is_declaration_file(&self, path: &Path) -> bool {
        let suffix = format!(".d.{}", self.config.strip_extension);
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(&suffix))
    }

    /// Destination path for a converted file: same stem, output extension of the direction
    pub fn output_path(&self, path: &Path, direction: Direction) -> PathBuf {
        let extension = match direction {
            Direction::StripTypes => &self.config.strip_output_extension,
            Direction::AddPlaceholders => &self.config.annotate_output_extension,
        };
        path.with_extension(extension)
    }

    pub fn convert_file(
        &self,
        source: &Path,
        destination: &Path,
        direction: Direction,
    ) -> Result<(), PipelineError> {
        let input = File::open(source).map_err(io_error(source))?;
        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_error(parent))?;
            }
        }
        let output = File::create(destination).map_err(io_error(destination))?;

        let result = convert_with(
            direction,
            BufReader::new(input),
            BufWriter::new(output),
            &self.options,
        );
        if let Err(error) = result {
            warn!("discarding partial output {}", destination.display());
            if let Err(cleanup) = fs::remove_file(destination) {
                warn!("could not remove {}: {}", destination.display(), cleanup);
            }
            return Err(PipelineError::Convert {
                path: source.to_path_buf(),
                source: error,
            });
        }

        info!(
            "{} {} -> {}",
            direction,
            source.display(),
            destination.display()
        );
        Ok(())
    }

    /// Convert every matching file below `source_dir` into the same relative place below
    /// `destination_dir`
    pub fn convert_tree(
        &self,
        source_dir: &Path,
        destination_dir: &Path,
    ) -> Result<PipelineReport, PipelineError> {
        let mut report = PipelineReport::default();
        let walker = WalkDir::new(source_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !entry.path().starts_with(destination_dir));

        for entry in walker {
            let entry = entry?;
            let Ok(relative) = entry.path().strip_prefix(source_dir) else {
                continue;
            };
            let target = destination_dir.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&target).map_err(io_error(&target))?;
                continue;
            }

            match self.direction_for(entry.path()) {
                Some(direction) => {
                    let target = self.output_path(&target, direction);
                    self.convert_file(entry.path(), &target, direction)?;
                    report.converted.push(target);
                }
                None => {
                    debug!("skipping {}", entry.path().display());
                    report.skipped.push(entry.path().to_path_buf());
                }
            }
        }

        info!(
            "converted {} file(s), skipped {}",
            report.converted.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Convert a single file or a whole tree, depending on what `source` is.
    ///
    /// For a single file, an existing directory as `destination` receives the converted file
    /// under its output name; any other `destination` is used as the file path.
    pub fn run(&self, source: &Path, destination: &Path) -> Result<PipelineReport, PipelineError> {
        if source.is_dir() {
            return self.convert_tree(source, destination);
        }

        let direction = self
            .direction_for(source)
            .ok_or_else(|| PipelineError::UnsupportedExtension(source.to_path_buf()))?;
        let target = match (destination.is_dir(), source.file_name()) {
            (true, Some(name)) => self.output_path(&destination.join(name), direction),
            _ => destination.to_path_buf(),
        };
        self.convert_file(source, &target, direction)?;
        Ok(PipelineReport {
            converted: vec![target],
            skipped: Vec::new(),
        })
    }
}
