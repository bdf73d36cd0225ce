//! Output files: tab-separated observations and the JSON run summary.

mod csv_export;
mod json_export;

pub use csv_export::ObservationWriter;
pub use json_export::RunSummary;
