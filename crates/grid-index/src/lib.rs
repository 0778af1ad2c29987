//! Synthesis of shared-coordinate dataset schemas from grid records.
//!
//! A [`Synthesizer`] scans an unordered [`GridIndex`] once and produces a
//! [`Dataset`]: one horizontal coordinate system per grid definition,
//! deduplicated vertical, time and ensemble coordinates, and per variable a
//! [`RecordTracker`] mapping every (ensemble, time, level) slot to the record
//! that fills it.
//!
//! ```ignore
//! let lookup = Arc::new(TableLookup::grib2());
//! let synthesizer = Synthesizer::new(lookup, SynthesisConfig::from_env())?;
//! let dataset = synthesizer.synthesize(&index);
//! let handle = dataset.find_variable(None, "Temperature")?;
//! match dataset.read_slot(handle, 0, 0, 2, 0..ny, 0..nx)? {
//!     SlotRead::Record(record) => decode(record),
//!     missing => missing.fill_buffer(),
//! }
//! ```

pub mod config;
pub mod dataset;
pub mod diagnostic;
pub mod emit;
pub mod ensemble;
pub mod error;
pub mod horizontal;
pub mod index;
pub mod naming;
pub mod schema;
pub mod synthesizer;
pub mod tables;
pub mod time;
pub mod tracker;
pub mod variable;
pub mod vertical;

pub use config::SynthesisConfig;
pub use dataset::{Dataset, GroupCoordinates, HorizontalGroup, SlotRead};
pub use diagnostic::{Diagnostic, Diagnostics};
pub use ensemble::{EnsembleCoord, EnsembleId, EnsembleKey, EnsembleRegistry};
pub use error::{Result, SynthesisError};
pub use horizontal::{Axis, HorizontalCoordSys, LatLon2d};
pub use index::GridIndex;
pub use schema::{
    DataType, DatasetSchema, DatasetSink, Dimension, GroupSchema, SchemaBuilder, VariableHandle,
    VariableSchema,
};
pub use synthesizer::{CancelCheck, NeverCancel, Synthesizer};
pub use tables::{build_lookup_for_model, build_lookup_from_path, load_model_config, ModelConfig};
pub use time::{placement_order, IntervalTriple, TimeCoord, TimeId, TimeRegistry};
pub use tracker::{Placement, RecordTracker};
pub use variable::{CoordinateIds, GridVariable, VariableKey};
pub use vertical::{HybridFactors, LevelSpec, LevelValue, VerticalCoord, VerticalId, VerticalRegistry};
