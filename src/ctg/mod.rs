//! CTG collaborators plugged into the pipeline: trace reader, classifier, chart renderer.

pub mod classify;
pub mod reader;
pub mod render;

pub use classify::{Classification, FisherClassifier};
pub use reader::{CtgTrace, DictReader, parse_trace, python_literal_to_json};
pub use render::{ChartStyle, draw_trace, render_trace};
