use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use derive_getters::Getters;
use serde::Deserialize;

use crate::core::classifier::{ClassifierSpec, SquirlsClassifier};
use crate::core::error::{Result, SquirlsError};
use crate::core::io::utils::read_compressed;
use crate::core::kmer::KmerTable;
use crate::core::params::SplicingParameters;
use crate::core::pwm::{PositionWeightMatrix, SplicingPwms};

pub const HEXAMER: usize = 6;
pub const SEPTAMER: usize = 7;

/// Transfer format of the pre-trained model as stored on disk.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ModelSpec {
    pub version: String,
    pub parameters: SplicingParameters,
    pub donor: Vec<Vec<f64>>,
    pub acceptor: Vec<Vec<f64>>,
    pub hexamers: HashMap<String, f64>,
    pub septamers: HashMap<String, f64>,
    pub classifier: ClassifierSpec,
}

impl ModelSpec {
    fn parse<T: BufRead>(reader: T) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Validated, immutable model shared by all workers.
#[derive(Debug, Getters)]
pub struct Model {
    version: String,
    pwms: Arc<SplicingPwms>,
    hexamers: Arc<KmerTable>,
    septamers: Arc<KmerTable>,
    classifier: SquirlsClassifier,
}

impl Model {
    /// Load a JSON model, plain or gzipped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let spec = read_compressed!(path, ModelSpec::parse)?;
        let model = Self::from_spec(spec)?;
        log::info!("Loaded model version {}", model.version);
        Ok(model)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_spec(serde_json::from_str(json)?)
    }

    pub fn from_spec(spec: ModelSpec) -> Result<Self> {
        spec.parameters.validate()?;
        let pwms = SplicingPwms::new(
            spec.parameters,
            PositionWeightMatrix::new("donor", &spec.donor)?,
            PositionWeightMatrix::new("acceptor", &spec.acceptor)?,
        )?;
        let hexamers = KmerTable::new(HEXAMER, spec.hexamers)?;
        let septamers = KmerTable::new(SEPTAMER, spec.septamers)?;
        for (table, name) in [(&hexamers, "hexamer"), (&septamers, "septamer")] {
            if table.is_empty() {
                return Err(SquirlsError::InvalidModel(format!("{} table is empty", name)));
            }
        }
        let classifier = SquirlsClassifier::from_spec(&spec.classifier)?;

        Ok(Self {
            version: spec.version,
            pwms: Arc::new(pwms),
            hexamers: Arc::new(hexamers),
            septamers: Arc::new(septamers),
            classifier,
        })
    }

    /// Classifier is moved out, tables are shared.
    pub fn into_parts(self) -> (Arc<SplicingPwms>, Arc<KmerTable>, Arc<KmerTable>, SquirlsClassifier) {
        (self.pwms, self.hexamers, self.septamers, self.classifier)
    }
}
