use rust_embed::RustEmbed;

/// Model and geoid files bundled into the binary
#[derive(RustEmbed)]
#[folder = "data/"]
struct Data;

pub(crate) const DEFAULT_COF: &str = "WMM.COF";
pub(crate) const DEFAULT_GEOID_GRID: &str = "geoid_15deg.grd";

/// Returns the contents of a bundled data file as text.
pub(crate) fn embedded_text(name: &str) -> Result<String, String> {
    let file = Data::get(name).ok_or_else(|| format!("{name} is not bundled"))?;
    String::from_utf8(file.data.into_owned()).map_err(|e| format!("{name} is not UTF-8: {e}"))
}
