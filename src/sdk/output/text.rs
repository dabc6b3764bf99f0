use super::{commit, OutputError};
use crate::sdk::routing::trace::SpeedSample;
use std::path::Path;

/// Renders one `lat,lon,speed` record per sample. A missing speed is an empty field.
pub fn render_text(samples: &[SpeedSample]) -> Result<Vec<u8>, csv::Error> {
    let mut buffer = Vec::new();
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut buffer);

        for sample in samples {
            writer.write_record([
                sample.coord.lat.to_string(),
                sample.coord.lon.to_string(),
                sample.speed.map(|v| v.to_string()).unwrap_or_default(),
            ])?;
        }
        writer.flush()?;
    }
    Ok(buffer)
}

pub fn write_text<P: AsRef<Path>>(samples: &[SpeedSample], path: P) -> Result<(), OutputError> {
    let path = path.as_ref();
    let contents = render_text(samples).map_err(|source| OutputError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    commit(path, &contents)
}
