//! RON input loader

use crate::error::{Error, Result};
use crate::schema::pool::RunePool;
use crate::schema::profile::Profile;
use crate::schema::weights::WeightOverrides;
use indexmap::IndexMap;
use log::{debug, warn};
use runeopt_core::{
    CharacterContext, ClassTable, Rune, RuneId, ScoreConfig, ScoreModel, WeightTable,
};
use runeopt_search::SearchOptions;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Everything loaded so far
#[derive(Debug, Clone)]
pub struct Inputs {
    /// Runes by id, in load order
    pub runes: IndexMap<RuneId, Rune>,
    pub profile: Option<Profile>,
    pub weights: WeightTable,
    pub classes: ClassTable,
    pub config: ScoreConfig,
}

impl Inputs {
    pub fn new() -> Self {
        Self {
            runes: IndexMap::new(),
            profile: None,
            weights: WeightTable::builtin(),
            classes: ClassTable::builtin(),
            config: ScoreConfig::default(),
        }
    }

    /// The rune pool in the shape `start_search` takes
    pub fn rune_pool(&self) -> Vec<Arc<Rune>> {
        self.runes.values().cloned().map(Arc::new).collect()
    }

    /// Score model built from the built-in tables plus every loaded override
    pub fn model(&self) -> ScoreModel {
        ScoreModel::new(self.weights.clone(), self.classes.clone(), self.config.clone())
    }

    /// The profile's context, or a default one when no profile was loaded
    pub fn context(&self) -> CharacterContext {
        self.profile
            .as_ref()
            .map(|p| p.context.clone())
            .unwrap_or_default()
    }

    pub fn options(&self) -> SearchOptions {
        self.profile
            .as_ref()
            .map(|p| p.options.clone())
            .unwrap_or_default()
    }
}

impl Default for Inputs {
    fn default() -> Self {
        Self::new()
    }
}

/// Loader for RON input files
pub struct Loader {
    inputs: Inputs,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            inputs: Inputs::new(),
        }
    }

    /// Load a single RON file
    ///
    /// The kind of file is guessed from its name first, then its content.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        debug!("loading {}", path.display());

        if filename.contains("rune") || content.contains("runes:") {
            self.load_runes_str(&content)
        } else if filename.contains("profile") || content.contains("context:") {
            self.load_profile_str(&content)
        } else if filename.contains("weight")
            || content.contains("effects:")
            || content.contains("demerits:")
            || content.contains("triggers:")
            || content.contains("classes:")
        {
            self.load_weights_str(&content)
        } else {
            Err(Error::InvalidSchema(format!(
                "{}: not a rune pool, profile or weight file",
                path.display()
            )))
        }
    }

    /// Load a rune pool from a RON string
    ///
    /// Rune ids must be unique across every loaded pool.
    pub fn load_runes_str(&mut self, content: &str) -> Result<()> {
        let file: RunePool = ron::from_str(content)?;
        let count = file.runes.len();
        for rune in file.runes {
            if self.inputs.runes.contains_key(&rune.id) {
                return Err(Error::DuplicateRune(rune.id));
            }
            self.inputs.runes.insert(rune.id, rune);
        }
        debug!("loaded {} runes", count);
        Ok(())
    }

    /// Load a character profile from a RON string
    pub fn load_profile_str(&mut self, content: &str) -> Result<()> {
        let profile: Profile = ron::from_str(content)?;
        if self.inputs.profile.is_some() {
            return Err(Error::DuplicateDefinition("profile".to_string()));
        }
        let class_code = &profile.context.class_code;
        if !class_code.is_empty() && self.inputs.classes.get(class_code).is_none() {
            // Classes may still arrive with a later weight file
            warn!("profile uses class {:?} which is not loaded yet", class_code);
        }
        self.inputs.profile = Some(profile);
        Ok(())
    }

    /// Load weight overrides from a RON string and apply them
    pub fn load_weights_str(&mut self, content: &str) -> Result<()> {
        let overrides: WeightOverrides = ron::from_str(content)?;
        overrides.validate()?;
        overrides.apply_to(&mut self.inputs.weights);
        for class in overrides.classes {
            self.inputs.classes.insert(class);
        }
        if let Some(config) = overrides.config {
            self.inputs.config = config;
        }
        Ok(())
    }

    /// Load all RON files from a directory
    ///
    /// Files are read in name order so duplicate detection and override
    /// precedence do not depend on the file system.
    pub fn load_directory(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if !path.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Not a directory: {:?}", path),
            )));
        }

        let mut entries = fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();

        for file_path in entries {
            if file_path.extension().is_some_and(|e| e == "ron") {
                self.load_file(&file_path)?;
            } else if file_path.is_dir() {
                self.load_directory(&file_path)?;
            }
        }

        Ok(())
    }

    /// Finish loading and return the inputs
    pub fn finish(self) -> Inputs {
        self.inputs
    }

    /// The inputs loaded so far
    pub fn inputs(&self) -> &Inputs {
        &self.inputs
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
