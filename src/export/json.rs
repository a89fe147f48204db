//! JSON dumps of decoded models.

use std::io::Write;

use rootcause::Report;

use crate::export::ExportError;
use crate::models::walker::DecodedModel;

/// Write the full decode result, mesh buffers included, as pretty JSON.
pub fn write_model_json(
    model: &DecodedModel,
    writer: &mut impl Write,
) -> Result<(), Report<ExportError>> {
    serde_json::to_writer_pretty(&mut *writer, model)
        .map_err(|e| Report::new(ExportError::from(e)))?;
    writeln!(writer).map_err(|e| Report::new(ExportError::from(e)))?;
    Ok(())
}
