pub mod cli;
pub mod ctx;
pub mod cv;
pub mod ident;
pub mod input;
pub mod io;
pub mod peaks;
pub mod pipeline;
pub mod report;
pub mod sampling;
pub mod schema {
    pub mod v1;
}
pub mod spectra;
pub mod spectrum_id;
pub mod submission;
pub mod validators;
pub mod xml_schema;
